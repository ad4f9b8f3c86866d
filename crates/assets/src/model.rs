use crate::AssetError;
use crate::draco::DracoDecoder;
use bakedscene_common::{MeshData, ModelFragment, ModelNode, Transform};
use glam::{Quat, Vec3};
use std::path::{Path, PathBuf};

/// glTF extension for Draco-compressed primitives.
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Where the compressed-geometry decoder lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    pub decoder_dir: PathBuf,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            decoder_dir: PathBuf::from("draco/"),
        }
    }
}

/// Imports `.glb` / `.gltf` files into a [`ModelFragment`].
#[derive(Debug, Clone, Default)]
pub struct ModelLoader {
    decoder: DecoderConfig,
}

impl ModelLoader {
    pub fn new(decoder: DecoderConfig) -> Self {
        Self { decoder }
    }

    pub fn decoder(&self) -> &DecoderConfig {
        &self.decoder
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<ModelFragment, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let gltf_err = |source| AssetError::Gltf {
            path: path.to_path_buf(),
            source,
        };

        // Validation rejects unknown required extensions, so look first.
        let raw = gltf::Gltf::from_slice_without_validation(&bytes).map_err(gltf_err)?;
        let compressed = raw.extensions_required().any(|ext| ext == DRACO_EXTENSION);
        let gltf::Gltf { document, blob } = if compressed {
            raw
        } else {
            gltf::Gltf::from_slice(&bytes).map_err(gltf_err)?
        };

        // Images are never decoded here; the baked maps load separately.
        let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(gltf_err)?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| AssetError::EmptyModel(path.to_path_buf()))?;

        let import = Import {
            path,
            document: &document,
            buffers: &buffers,
            decoder_dir: &self.decoder.decoder_dir,
        };
        let children = scene
            .nodes()
            .map(|node| import.node(&node))
            .collect::<Result<Vec<_>, _>>()?;

        let fragment = ModelFragment {
            name: scene
                .name()
                .map(str::to_string)
                .or_else(|| {
                    path.file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                })
                .unwrap_or_default(),
            children,
        };
        tracing::debug!(
            "imported {} ({} root nodes, {} total, compressed={compressed})",
            path.display(),
            fragment.children.len(),
            fragment.node_count()
        );
        Ok(fragment)
    }
}

struct Import<'a> {
    path: &'a Path,
    document: &'a gltf::Document,
    buffers: &'a [gltf::buffer::Data],
    decoder_dir: &'a Path,
}

impl Import<'_> {
    fn node(&self, node: &gltf::Node<'_>) -> Result<ModelNode, AssetError> {
        let (t, r, s) = node.transform().decomposed();
        let transform = Transform {
            position: Vec3::from(t),
            rotation: Quat::from_array(r),
            scale: Vec3::from(s),
        };

        let mesh = match node.mesh() {
            Some(mesh) => self.mesh(&mesh)?,
            None => None,
        };

        Ok(ModelNode {
            name: node.name().unwrap_or_default().to_string(),
            transform,
            mesh,
            material: None,
            children: node
                .children()
                .map(|child| self.node(&child))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn mesh(&self, mesh: &gltf::Mesh<'_>) -> Result<Option<MeshData>, AssetError> {
        let mut merged = MeshData::default();
        for prim in mesh.primitives() {
            if prim.mode() != gltf::mesh::Mode::Triangles {
                tracing::debug!(
                    "skipping {:?} primitive in mesh {:?}",
                    prim.mode(),
                    mesh.name()
                );
                continue;
            }
            if let Some(view) = draco_view(&prim) {
                merged.append(self.decode(view)?);
                continue;
            }

            let reader =
                prim.reader(|buffer| self.buffers.get(buffer.index()).map(|d| d.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let uvs = reader
                .read_tex_coords(0)
                .map(|tc| tc.into_f32().collect())
                .unwrap_or_default();
            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            merged.append(MeshData {
                positions,
                uvs,
                indices,
            });
        }
        Ok((!merged.is_empty()).then_some(merged))
    }

    fn decode(&self, view_index: usize) -> Result<MeshData, AssetError> {
        let decoder = DracoDecoder::locate(self.decoder_dir).ok_or_else(|| {
            AssetError::CompressedGeometry {
                path: self.path.to_path_buf(),
                decoder_dir: self.decoder_dir.to_path_buf(),
            }
        })?;
        let bytes = self
            .document
            .views()
            .nth(view_index)
            .and_then(|view| {
                let data = self.buffers.get(view.buffer().index())?;
                data.0.get(view.offset()..view.offset() + view.length())
            })
            .ok_or_else(|| AssetError::Decoder {
                path: self.path.to_path_buf(),
                message: format!("compressed buffer view {view_index} is out of range"),
            })?;
        decoder.decode(self.path, bytes)
    }
}

/// Buffer view holding the primitive's Draco stream, if it has one.
fn draco_view(prim: &gltf::Primitive<'_>) -> Option<usize> {
    let ext = prim.extensions()?.get(DRACO_EXTENSION)?;
    let view = ext.get("bufferView")?.as_u64()?;
    usize::try_from(view).ok()
}
