//! Core types: math re-exports, coordinate frames, Camera, sun light.

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod axis;
pub mod camera;
pub mod light;
