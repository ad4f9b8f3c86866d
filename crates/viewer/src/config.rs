use bakedscene_assets::DecoderConfig;
use bakedscene_controls::OrbitConfig;
use bakedscene_render::PerspectiveCamera;
use bakedscene_scene::Fog;
use bakedscene_tools::PANEL_WIDTH;
use std::path::{Path, PathBuf};

/// Everything the viewer needs to start. Binaries override fields from
/// their command line; there is no config file.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Root that the asset paths below are relative to.
    pub asset_dir: PathBuf,
    pub baked_texture: PathBuf,
    pub environment_texture: PathBuf,
    pub model: PathBuf,
    /// Compressed-geometry decoder directory, relative to `asset_dir`.
    pub decoder_dir: PathBuf,
    pub fog: Fog,
    pub camera: PerspectiveCamera,
    pub controls: OrbitConfig,
    pub panel_width: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("static"),
            baked_texture: PathBuf::from("house/bakedHouse.jpg"),
            environment_texture: PathBuf::from("house/bakedEnvironment.jpg"),
            model: PathBuf::from("house/house.glb"),
            decoder_dir: PathBuf::from("draco"),
            fog: Fog::default(),
            camera: PerspectiveCamera::default(),
            controls: OrbitConfig::default(),
            panel_width: PANEL_WIDTH,
        }
    }
}

impl ViewerConfig {
    /// Defaults rooted at another asset directory.
    pub fn with_asset_dir(asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            ..Self::default()
        }
    }

    fn resolve(&self, rel: &Path) -> PathBuf {
        self.asset_dir.join(rel)
    }

    pub fn baked_texture_path(&self) -> PathBuf {
        self.resolve(&self.baked_texture)
    }

    pub fn environment_texture_path(&self) -> PathBuf {
        self.resolve(&self.environment_texture)
    }

    pub fn model_path(&self) -> PathBuf {
        self.resolve(&self.model)
    }

    pub fn decoder(&self) -> DecoderConfig {
        DecoderConfig {
            decoder_dir: self.resolve(&self.decoder_dir),
        }
    }

    /// The three files a viewer start needs, in load order.
    pub fn required_files(&self) -> [PathBuf; 3] {
        [
            self.baked_texture_path(),
            self.environment_texture_path(),
            self.model_path(),
        ]
    }

    /// Required files that do not exist on disk.
    pub fn missing_files(&self) -> Vec<PathBuf> {
        self.required_files()
            .into_iter()
            .filter(|p| !p.is_file())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_house_assets() {
        let config = ViewerConfig::default();
        assert_eq!(
            config.baked_texture_path(),
            Path::new("static/house/bakedHouse.jpg")
        );
        assert_eq!(
            config.environment_texture_path(),
            Path::new("static/house/bakedEnvironment.jpg")
        );
        assert_eq!(config.model_path(), Path::new("static/house/house.glb"));
        assert_eq!(config.decoder().decoder_dir, Path::new("static/draco"));
        assert_eq!(config.fog.color.to_hex(), "#263740");
        assert_eq!(config.panel_width, 400.0);
    }

    #[test]
    fn missing_files_lists_absent_assets() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::with_asset_dir(dir.path());
        assert_eq!(config.missing_files().len(), 3);

        std::fs::create_dir_all(dir.path().join("house")).unwrap();
        std::fs::write(config.model_path(), b"glTF").unwrap();
        assert_eq!(
            config.missing_files(),
            vec![config.baked_texture_path(), config.environment_texture_path()]
        );
    }
}
