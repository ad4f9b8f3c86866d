//! Shared types for the baked scene viewer.
//!
//! Value types only: no I/O, no GPU state. Every other crate in the
//! workspace depends on this one.

mod model;
mod types;

pub use model::{MeshData, ModelFragment, ModelNode};
pub use types::{
    Color, CommonError, MaterialHandle, NodeId, TextureHandle, Transform, ViewportSize,
};
