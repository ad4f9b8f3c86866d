use crate::AssetError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the texel values of a texture are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Values are linear (data textures).
    #[default]
    Linear,
    /// Values are sRGB encoded (color maps, baked lighting).
    Srgb,
}

/// Options applied when a texture finishes loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureOptions {
    pub color_space: ColorSpace,
    /// Flip rows so the first row of the image is the bottom of the texture.
    /// glTF UVs expect the image unflipped.
    pub flip_y: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            color_space: ColorSpace::Linear,
            flip_y: true,
        }
    }
}

impl TextureOptions {
    /// Settings for baked lighting maps applied to glTF geometry.
    pub fn baked() -> Self {
        Self {
            color_space: ColorSpace::Srgb,
            flip_y: false,
        }
    }
}

/// A decoded RGBA8 texture ready for upload.
#[derive(Clone, PartialEq)]
pub struct TextureData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub flip_y: bool,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureData")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color_space", &self.color_space)
            .field("flip_y", &self.flip_y)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl TextureData {
    /// A 1x1 texture of a single RGBA value.
    pub fn solid(name: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            width: 1,
            height: 1,
            color_space: ColorSpace::Srgb,
            flip_y: false,
            rgba: rgba.to_vec(),
        }
    }
}

/// Decodes image files into [`TextureData`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureLoader {
    options: TextureOptions,
}

impl TextureLoader {
    pub fn new(options: TextureOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> TextureOptions {
        self.options
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<TextureData, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut image = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        if self.options.flip_y {
            image::imageops::flip_vertical_in_place(&mut image);
        }

        let (width, height) = image.dimensions();
        tracing::debug!(
            "decoded texture {} ({width}x{height}, {:?})",
            path.display(),
            self.options.color_space
        );

        Ok(TextureData {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            width,
            height,
            color_space: self.options.color_space,
            flip_y: self.options.flip_y,
            rgba: image.into_raw(),
        })
    }
}
