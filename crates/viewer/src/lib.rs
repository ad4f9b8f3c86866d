//! Viewer runtime: the context that owns the scene and everything around it,
//! asset-load orchestration, and the frame loop.
//!
//! # Invariants
//! - One [`ViewerContext`] owns all viewer state; nothing is global.
//! - The frame loop only starts once assets are installed without error.
//! - A cancelled [`ShutdownToken`] stops the loop before its next render.

pub mod config;
pub mod context;
pub mod frame_loop;
pub mod loading;

pub use config::ViewerConfig;
pub use context::ViewerContext;
pub use frame_loop::{FrameLoop, FrameStats, ShutdownToken};
pub use loading::{PendingAssets, SceneAssets, load_scene_assets, spawn_scene_loads};

use bakedscene_assets::AssetError;
use bakedscene_materials::MaterialError;
use bakedscene_scene::AssemblyError;

/// Errors from bringing the viewer up.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Material(#[from] MaterialError),
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::ViewerConfig;
    use bakedscene_assets::fixtures;
    use std::path::Path;

    /// Lay out a house asset directory whose model has one node per name.
    pub fn write_house(dir: &Path, names: &[&str]) -> ViewerConfig {
        let house = dir.join("house");
        std::fs::create_dir_all(&house).unwrap();
        fixtures::write_jpeg(&house, "bakedHouse.jpg", [200, 150, 100]).unwrap();
        fixtures::write_jpeg(&house, "bakedEnvironment.jpg", [20, 40, 60]).unwrap();
        fixtures::write_gltf(&house, "house.gltf", names).unwrap();
        ViewerConfig {
            model: "house/house.gltf".into(),
            ..ViewerConfig::with_asset_dir(dir)
        }
    }
}
