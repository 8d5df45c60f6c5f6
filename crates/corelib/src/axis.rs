//! Coordinate frames. Model files are authored Y-up; the scene is Z-up.

use crate::Vec3;

/// Rotation from the Y-up file frame into the Z-up scene frame: +90° about X,
/// written out exactly. `(x, y, z)` becomes `(x, -z, y)`.
#[inline]
pub fn to_z_up(v: [f32; 3]) -> [f32; 3] {
    let [x, y, z] = v;
    [x, -z, y]
}

/// Up vector of the scene frame.
pub const UP: Vec3 = Vec3::Z;

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::Quat;

    fn close(a: [f32; 3], b: Vec3) -> bool {
        (Vec3::from(a) - b).length() < 1e-5
    }

    #[test]
    fn matches_quarter_turn_about_x() {
        let p = [0.3, -1.7, 2.5];
        assert!(close(to_z_up(p), Quat::from_rotation_x(FRAC_PI_2) * Vec3::from(p)));
    }

    #[test]
    fn file_up_becomes_scene_up() {
        assert_eq!(to_z_up([0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        assert_eq!(Vec3::from(to_z_up([0.0, 1.0, 0.0])), UP);
    }

    #[test]
    fn applying_twice_is_half_turn_about_x() {
        let p = [1.0, 2.0, 3.0];
        let twice = to_z_up(to_z_up(p));
        let half_turn = Quat::from_rotation_x(PI) * Vec3::from(p);
        assert!(close(twice, half_turn));
        // A second application is never the identity and never the single rotation.
        assert!(!close(twice, Vec3::from(p)));
        assert!(!close(twice, Vec3::from(to_z_up(p))));
    }
}
