//! On-disk fixtures for loader tests: tiny glTF documents and images.

use std::path::{Path, PathBuf};

/// One triangle: positions, uvs, u16 indices.
const TRIANGLE_BUFFER: &str =
    "AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAABAAIAAAA=";

/// Build a `.gltf` document whose scene has one triangle node per name.
pub fn gltf_json(names: &[&str], extensions_required: &[&str]) -> String {
    let nodes: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                r#"{{"name":"{name}","mesh":0,"translation":[{i}.0,0.0,0.0]}}"#
            )
        })
        .collect();
    let roots: Vec<String> = (0..names.len()).map(|i| i.to_string()).collect();
    let ext: Vec<String> = extensions_required
        .iter()
        .map(|e| format!("\"{e}\""))
        .collect();
    let ext_block = if ext.is_empty() {
        String::new()
    } else {
        format!(
            r#""extensionsUsed":[{0}],"extensionsRequired":[{0}],"#,
            ext.join(",")
        )
    };
    format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  {ext_block}
  "scene": 0,
  "scenes": [{{"name": "house", "nodes": [{roots}]}}],
  "nodes": [{nodes}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0, "TEXCOORD_0": 1}}, "indices": 2}}]}}],
  "buffers": [{{"byteLength": 68, "uri": "data:application/octet-stream;base64,{TRIANGLE_BUFFER}"}}],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962}},
    {{"buffer": 0, "byteOffset": 36, "byteLength": 24, "target": 34962}},
    {{"buffer": 0, "byteOffset": 60, "byteLength": 6, "target": 34963}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}},
    {{"bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2"}},
    {{"bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR"}}
  ]
}}"#,
        roots = roots.join(","),
        nodes = nodes.join(","),
    )
}

/// Like [`gltf_json`], but the primitive is stored through the Draco
/// extension. The compressed view holds the bytes `DRACO\0\0\0`.
pub fn draco_gltf_json(names: &[&str]) -> String {
    let nodes: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| format!(r#"{{"name":"{name}","mesh":0,"translation":[{i}.0,0.0,0.0]}}"#))
        .collect();
    let roots: Vec<String> = (0..names.len()).map(|i| i.to_string()).collect();
    format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "extensionsUsed": ["KHR_draco_mesh_compression"],
  "extensionsRequired": ["KHR_draco_mesh_compression"],
  "scene": 0,
  "scenes": [{{"name": "house", "nodes": [{roots}]}}],
  "nodes": [{nodes}],
  "meshes": [{{"primitives": [{{
    "attributes": {{"POSITION": 0, "TEXCOORD_0": 1}},
    "indices": 2,
    "extensions": {{"KHR_draco_mesh_compression": {{"bufferView": 0, "attributes": {{"POSITION": 0, "TEXCOORD_0": 1}}}}}}
  }}]}}],
  "buffers": [{{"byteLength": 8, "uri": "data:application/octet-stream;base64,RFJBQ08AAAA="}}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": 8}}],
  "accessors": [
    {{"componentType": 5126, "count": 4, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}},
    {{"componentType": 5126, "count": 4, "type": "VEC2"}},
    {{"componentType": 5123, "count": 6, "type": "SCALAR"}}
  ]
}}"#,
        roots = roots.join(","),
        nodes = nodes.join(","),
    )
}

/// Install a stand-in `draco_decoder` in `dir` that checks its input starts
/// with `DRACO` and writes `obj` to the requested output path.
#[cfg(unix)]
pub fn write_stub_decoder(dir: &Path, obj: &str) -> std::io::Result<PathBuf> {
    let script = format!(
        r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -i) src="$2"; shift ;;
    -o) dst="$2"; shift ;;
  esac
  shift
done
if [ "$(head -c 5 "$src")" != "DRACO" ]; then
  echo "not a draco stream" >&2
  exit 1
fi
cat > "$dst" <<'OBJ'
{obj}
OBJ
"#
    );
    write_executable(dir, &script)
}

/// Install a `draco_decoder` in `dir` that always fails.
#[cfg(unix)]
pub fn write_failing_decoder(dir: &Path) -> std::io::Result<PathBuf> {
    write_executable(dir, "#!/bin/sh\necho 'corrupt mesh' >&2\nexit 2\n")
}

#[cfg(unix)]
fn write_executable(dir: &Path, script: &str) -> std::io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(crate::draco::DECODER_NAME);
    std::fs::write(&path, script)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

pub fn write_gltf(dir: &Path, file: &str, names: &[&str]) -> std::io::Result<PathBuf> {
    let path = dir.join(file);
    std::fs::write(&path, gltf_json(names, &[]))?;
    Ok(path)
}

/// Write a small sRGB JPEG of a single color.
pub fn write_jpeg(dir: &Path, file: &str, rgb: [u8; 3]) -> image::ImageResult<PathBuf> {
    let path = dir.join(file);
    image::RgbImage::from_pixel(4, 4, image::Rgb(rgb)).save(&path)?;
    Ok(path)
}
