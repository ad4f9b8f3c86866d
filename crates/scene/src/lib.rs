//! Scene context: the scene graph, its fog, and model assembly.
//!
//! # Invariants
//! - All scene mutations flow through explicit operations and are logged.
//! - A model is attached only after every required node has been found.
//! - A failed assembly leaves the scene untouched.

mod assembly;
mod scene;

pub use assembly::{AssemblyError, REQUIRED_NODES, RequiredNode, assemble, missing_nodes};
pub use scene::{DEFAULT_FOG_COLOR, Fog, Scene, SceneChild, SceneEvent, SceneObject};
