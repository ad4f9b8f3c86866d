//! Asset loading: textures via `image`, models via `gltf`, Draco geometry
//! via the external decoder in the configured decoder directory.
//!
//! Loads run on worker threads ([`LoadTask`]) and hand back typed results.
//! Nothing here touches the scene; callers decide what to do with a loaded
//! texture or fragment.

mod draco;
mod model;
mod task;
mod texture;

use std::path::PathBuf;

pub use draco::DECODER_NAME;
pub use model::{DRACO_EXTENSION, DecoderConfig, ModelLoader};
pub use task::LoadTask;
pub use texture::{ColorSpace, TextureData, TextureLoader, TextureOptions};

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to import model {}: {source}", path.display())]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error(
        "{} uses compressed geometry but no decoder was found in {}",
        path.display(),
        decoder_dir.display()
    )]
    CompressedGeometry { path: PathBuf, decoder_dir: PathBuf },
    #[error("failed to decode compressed geometry in {}: {message}", path.display())]
    Decoder { path: PathBuf, message: String },
    #[error("model {} has no scene", .0.display())]
    EmptyModel(PathBuf),
    #[error("could not start load task {label}: {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },
    #[error("load task {0} panicked")]
    TaskPanicked(String),
}
