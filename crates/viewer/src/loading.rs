use crate::{ViewerConfig, ViewerError};
use bakedscene_assets::{LoadTask, ModelLoader, TextureData, TextureLoader, TextureOptions};
use bakedscene_common::ModelFragment;

/// Everything the house needs, fully loaded.
#[derive(Debug)]
pub struct SceneAssets {
    pub baked: TextureData,
    pub environment: TextureData,
    pub model: ModelFragment,
}

/// The three loads in flight.
pub struct PendingAssets {
    baked: LoadTask<TextureData>,
    environment: LoadTask<TextureData>,
    model: LoadTask<ModelFragment>,
}

/// Start the two texture loads and the model load on worker threads.
pub fn spawn_scene_loads(config: &ViewerConfig) -> Result<PendingAssets, ViewerError> {
    let textures = TextureLoader::new(TextureOptions::baked());
    let models = ModelLoader::new(config.decoder());

    let path = config.baked_texture_path();
    let baked = LoadTask::spawn("bakedHouse", move || textures.load(path))?;
    let path = config.environment_texture_path();
    let environment = LoadTask::spawn("bakedEnvironment", move || textures.load(path))?;
    let path = config.model_path();
    let model = LoadTask::spawn("house", move || models.load(path))?;

    tracing::info!("loading assets from {}", config.asset_dir.display());
    Ok(PendingAssets {
        baked,
        environment,
        model,
    })
}

impl PendingAssets {
    pub fn is_finished(&self) -> bool {
        self.baked.is_finished() && self.environment.is_finished() && self.model.is_finished()
    }

    /// Wait for all three loads. Every task is joined even if an earlier one
    /// failed; the first error in load order is returned.
    pub fn join(self) -> Result<SceneAssets, ViewerError> {
        let baked = self.baked.join();
        let environment = self.environment.join();
        let model = self.model.join();
        Ok(SceneAssets {
            baked: baked?,
            environment: environment?,
            model: model?,
        })
    }
}

/// Spawn and join the scene loads in one call.
pub fn load_scene_assets(config: &ViewerConfig) -> Result<SceneAssets, ViewerError> {
    spawn_scene_loads(config)?.join()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_house;
    use bakedscene_assets::{AssetError, ColorSpace};
    use bakedscene_scene::REQUIRED_NODES;

    #[test]
    fn loads_all_three_assets() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<_> = REQUIRED_NODES.iter().map(|r| r.name).collect();
        let config = write_house(dir.path(), &names);

        let assets = load_scene_assets(&config).unwrap();
        assert_eq!(assets.baked.color_space, ColorSpace::Srgb);
        assert!(!assets.baked.flip_y);
        assert_eq!((assets.environment.width, assets.environment.height), (4, 4));
        assert_eq!(assets.model.children.len(), 5);
    }

    #[test]
    fn missing_texture_fails_the_join() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_house(dir.path(), &["bakedModel"]);
        std::fs::remove_file(config.environment_texture_path()).unwrap();

        let err = load_scene_assets(&config).unwrap_err();
        assert!(matches!(err, ViewerError::Asset(AssetError::Io { .. })));
    }

    #[test]
    fn empty_asset_dir_reports_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::with_asset_dir(dir.path());
        match load_scene_assets(&config) {
            Err(ViewerError::Asset(AssetError::Io { path, .. })) => {
                assert_eq!(path, config.baked_texture_path());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
