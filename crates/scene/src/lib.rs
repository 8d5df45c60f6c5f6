//! Application state and scene composition. Pure: no I/O, no GPU.

pub mod compose;
pub mod state;

pub use compose::{Entity, Material, Scene, View, view};
pub use state::{AppEvent, AppState, Slot};
