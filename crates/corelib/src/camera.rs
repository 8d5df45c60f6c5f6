use crate::{Mat4, Vec3, axis};

/// Simple perspective camera (right-handed, depth in [0, 1]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

/// Orbit viewpoint around the scene's Z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub focal_point: Vec3,
    /// Angle in the XY plane, measured from +X towards +Y.
    pub azimuth_rad: f32,
    /// Angle above the XY plane.
    pub elevation_rad: f32,
    pub distance: f32,
    pub fov_y_rad: f32,
    pub aspect: f32,
}

impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn new_perspective(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_rad: f32,
        z_near: f32,
        z_far: f32,
        aspect: f32,
    ) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y_rad,
            z_near,
            z_far,
            aspect,
        }
    }

    /// Camera looking at `orbit.focal_point` from the given azimuth/elevation.
    /// Clip planes are sized from the orbit distance.
    pub fn orbit_z(orbit: Orbit) -> Self {
        let (sin_az, cos_az) = orbit.azimuth_rad.sin_cos();
        let (sin_el, cos_el) = orbit.elevation_rad.sin_cos();
        let offset = Vec3::new(cos_el * cos_az, cos_el * sin_az, sin_el) * orbit.distance;
        Self::new_perspective(
            orbit.focal_point + offset,
            orbit.focal_point,
            axis::UP,
            orbit.fov_y_rad,
            (orbit.distance * 0.01).max(1e-3),
            orbit.distance * 100.0,
            orbit.aspect,
        )
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }
}
