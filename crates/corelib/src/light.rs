//! Directional ("sun") light.

use crate::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Unit vector along which light travels.
    pub direction: Vec3,
    /// Linear RGB color, premultiplied by intensity.
    pub color: Vec3,
    pub casts_shadows: bool,
}

impl DirectionalLight {
    /// Sun whose travel direction is given as azimuth (from +X towards +Y)
    /// and elevation (negative points down) in the Z-up frame.
    pub fn sun(azimuth_rad: f32, elevation_rad: f32, color: Vec3) -> Self {
        let (sin_az, cos_az) = azimuth_rad.sin_cos();
        let (sin_el, cos_el) = elevation_rad.sin_cos();
        Self {
            direction: Vec3::new(cos_el * cos_az, cos_el * sin_az, sin_el).normalize(),
            color,
            casts_shadows: true,
        }
    }
}
