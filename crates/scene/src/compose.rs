//! Scene composition: a pure function from [`AppState`] to what should be
//! shown.

use std::borrow::Cow;

use asset::{MeshBundle, MeshData, MeshVertex, ShadowVolume, TextureData};
use corelib::camera::{Camera, Orbit};
use corelib::light::DirectionalLight;
use corelib::{Vec3, vec3};

use crate::state::AppState;

pub const PLACEHOLDER: &str = "Loading…";

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 640;
/// Transparent.
pub const BACKGROUND: [f64; 4] = [0.0, 0.0, 0.0, 0.0];

const GROUND_HALF_EXTENT: f32 = 5.0;
const GROUND_COLOR: [f32; 3] = [0.22, 0.3, 0.24];
const SUN_COLOR: Vec3 = vec3(1.0, 0.96, 0.88);
const AMBIENT: Vec3 = vec3(0.22, 0.24, 0.28);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material<'a> {
    Textured(&'a TextureData),
    /// Flat linear RGB color.
    Matte([f32; 3]),
}

/// One drawable surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity<'a> {
    pub label: &'static str,
    pub mesh: Cow<'a, MeshData>,
    pub material: Material<'a>,
    pub shadow: Option<&'a ShadowVolume>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene<'a> {
    pub camera: Camera,
    pub sun: DirectionalLight,
    pub ambient: Vec3,
    pub width: u32,
    pub height: u32,
    pub background: [f64; 4],
    pub entities: Vec<Entity<'a>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum View<'a> {
    Placeholder(&'static str),
    Scene(Scene<'a>),
}

/// Derive what to show from the current state.
pub fn view(state: &AppState) -> View<'_> {
    match state {
        AppState::Ready { texture, mesh } => View::Scene(compose(texture, mesh)),
        AppState::Incomplete { .. } => View::Placeholder(PLACEHOLDER),
    }
}

fn compose<'a>(texture: &'a TextureData, mesh: &'a MeshBundle) -> Scene<'a> {
    let camera = Camera::orbit_z(Orbit {
        focal_point: vec3(0.5, 0.0, 0.0),
        azimuth_rad: (-40f32).to_radians(),
        elevation_rad: 25f32.to_radians(),
        distance: 10.0,
        fov_y_rad: 30f32.to_radians(),
        aspect: WIDTH as f32 / HEIGHT as f32,
    });
    let sun = DirectionalLight::sun(45f32.to_radians(), (-60f32).to_radians(), SUN_COLOR);

    let mut entities = vec![Entity {
        label: "pod",
        mesh: Cow::Borrowed(&mesh.primary),
        material: Material::Textured(texture),
        shadow: Some(&mesh.shadow),
    }];
    // Only the first gun is shown; the rest stay decoded but unused.
    if let Some(gun) = mesh.first_gun() {
        entities.push(Entity {
            label: "gun",
            mesh: Cow::Borrowed(gun),
            material: Material::Textured(texture),
            shadow: None,
        });
    }
    entities.push(Entity {
        label: "ground",
        mesh: Cow::Owned(ground_quad(GROUND_HALF_EXTENT)),
        material: Material::Matte(GROUND_COLOR),
        shadow: None,
    });

    Scene {
        camera,
        sun,
        ambient: AMBIENT,
        width: WIDTH,
        height: HEIGHT,
        background: BACKGROUND,
        entities,
    }
}

/// Square in the z = 0 plane facing +Z.
fn ground_quad(half: f32) -> MeshData {
    let up = [0.0, 0.0, 1.0];
    let vertices = vec![
        MeshVertex::new([-half, -half, 0.0], up, [0.0, 1.0]),
        MeshVertex::new([half, -half, 0.0], up, [1.0, 1.0]),
        MeshVertex::new([half, half, 0.0], up, [1.0, 0.0]),
        MeshVertex::new([-half, half, 0.0], up, [0.0, 0.0]),
    ];
    MeshData::new(vertices, vec![0, 1, 2, 0, 2, 3])
}
