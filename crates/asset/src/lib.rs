//! Asset loading/parsers: OBJ documents, the Pod model decoder, shadow
//! volumes, PNG textures and the network/disk loaders that fetch them.

pub mod error;
pub mod loader;
pub mod mesh;
pub mod obj;
pub mod pod;
pub mod shadow;
pub mod texture;

pub use error::{DecodeError, LoadError};
pub use loader::{AssetSource, load_mesh, load_texture};
pub use mesh::{MeshData, MeshVertex};
pub use pod::{MeshBundle, PodPart, decode_pod};
pub use shadow::ShadowVolume;
pub use texture::{FilterMode, TextureData};
