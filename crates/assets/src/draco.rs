//! Draco-compressed primitives.
//!
//! Decoding is delegated to the `draco_decoder` tool shipped in the decoder
//! directory: each compressed buffer view is written to a scratch file,
//! decoded to Wavefront OBJ and read back as [`MeshData`].

use crate::AssetError;
use bakedscene_common::MeshData;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// File name of the decoder executable inside the decoder directory.
pub const DECODER_NAME: &str = "draco_decoder";

#[derive(Debug, Clone)]
pub(crate) struct DracoDecoder {
    executable: PathBuf,
}

impl DracoDecoder {
    /// Find the decoder executable in `dir`.
    pub(crate) fn locate(dir: &Path) -> Option<Self> {
        let executable = dir.join(format!("{DECODER_NAME}{}", std::env::consts::EXE_SUFFIX));
        executable.is_file().then_some(Self { executable })
    }

    /// Decode one compressed primitive of `model`.
    pub(crate) fn decode(&self, model: &Path, compressed: &[u8]) -> Result<MeshData, AssetError> {
        let scratch = tempfile::tempdir().map_err(|source| AssetError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
        let input = scratch.path().join("primitive.drc");
        let output = scratch.path().join("primitive.obj");
        std::fs::write(&input, compressed).map_err(|source| AssetError::Io {
            path: input.clone(),
            source,
        })?;

        let result = Command::new(&self.executable)
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .output()
            .map_err(|source| AssetError::Io {
                path: self.executable.clone(),
                source,
            })?;
        if !result.status.success() {
            return Err(AssetError::Decoder {
                path: model.to_path_buf(),
                message: format!(
                    "{} exited with {}: {}",
                    self.executable.display(),
                    result.status,
                    String::from_utf8_lossy(&result.stderr).trim()
                ),
            });
        }

        let text = std::fs::read_to_string(&output).map_err(|source| AssetError::Io {
            path: output.clone(),
            source,
        })?;
        let mesh = parse_obj(&text).map_err(|message| AssetError::Decoder {
            path: model.to_path_buf(),
            message,
        })?;
        tracing::debug!(
            "decoded {} compressed bytes into {} vertices",
            compressed.len(),
            mesh.positions.len()
        );
        Ok(mesh)
    }
}

/// Read the decoder's OBJ output. Faces are fan-triangulated and every
/// distinct position/uv pair becomes one vertex.
pub(crate) fn parse_obj(text: &str) -> Result<MeshData, String> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut corners: Vec<(usize, Option<usize>)> = Vec::new();

    for (n, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let line_no = n + 1;
        match tokens.next() {
            Some("v") => positions.push(floats::<3>(tokens, line_no)?),
            Some("vt") => tex_coords.push(floats::<2>(tokens, line_no)?),
            Some("f") => {
                let face = tokens
                    .map(|corner| parse_corner(corner, positions.len(), tex_coords.len(), line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if face.len() < 3 {
                    return Err(format!("line {line_no}: face with {} corners", face.len()));
                }
                for i in 1..face.len() - 1 {
                    corners.extend([face[0], face[i], face[i + 1]]);
                }
            }
            _ => {}
        }
    }

    let has_uvs = !tex_coords.is_empty();
    let mut mesh = MeshData::default();
    let mut seen: HashMap<(usize, Option<usize>), u32> = HashMap::new();
    for corner in corners {
        let index = *seen.entry(corner).or_insert_with(|| {
            let (p, t) = corner;
            mesh.positions.push(positions[p]);
            if has_uvs {
                mesh.uvs.push(t.map_or([0.0; 2], |t| tex_coords[t]));
            }
            (mesh.positions.len() - 1) as u32
        });
        mesh.indices.push(index);
    }
    Ok(mesh)
}

fn floats<'a, const N: usize>(
    mut tokens: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<[f32; N], String> {
    let mut out = [0.0; N];
    for slot in &mut out {
        let token = tokens
            .next()
            .ok_or_else(|| format!("line {line_no}: expected {N} values"))?;
        *slot = token
            .parse()
            .map_err(|_| format!("line {line_no}: bad number {token:?}"))?;
    }
    Ok(out)
}

fn parse_corner(
    corner: &str,
    position_count: usize,
    tex_count: usize,
    line_no: usize,
) -> Result<(usize, Option<usize>), String> {
    let mut parts = corner.split('/');
    let position = parts
        .next()
        .ok_or_else(|| format!("line {line_no}: empty face corner"))?;
    let position = resolve(position, position_count, line_no)?;
    let tex = match parts.next() {
        Some(t) if !t.is_empty() => Some(resolve(t, tex_count, line_no)?),
        _ => None,
    };
    Ok((position, tex))
}

// OBJ indices are 1-based; negative ones count back from the end.
fn resolve(token: &str, count: usize, line_no: usize) -> Result<usize, String> {
    let raw: i64 = token
        .parse()
        .map_err(|_| format!("line {line_no}: bad index {token:?}"))?;
    let index = if raw > 0 {
        raw - 1
    } else {
        count as i64 + raw
    };
    if raw == 0 || index < 0 || index >= count as i64 {
        return Err(format!("line {line_no}: index {raw} out of range"));
    }
    Ok(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = parse_obj(
            "# draco\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4\n",
        )
        .unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.uvs[2], [1.0, 1.0]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn shared_position_with_distinct_uvs_splits() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvt 0.5 0.5\nf 1/1 2/2 3/3\nf 1/4 3/3 2/2\n",
        )
        .unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.positions[3], [0.0, 0.0, 0.0]);
        assert_eq!(mesh.uvs[3], [0.5, 0.5]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 2, 1]);
    }

    #[test]
    fn position_only_faces_and_negative_indices() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3//1 -2//1 -1//1\n").unwrap();
        assert!(mesh.uvs.is_empty());
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = parse_obj("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(err.contains("line 2"), "{err}");
    }

    #[test]
    fn missing_executable_is_not_located() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DracoDecoder::locate(dir.path()).is_none());
    }
}
