/// WGSL shader for unlit baked materials with linear-range fog.
///
/// Group 0 holds per-frame data, group 1 the material, group 2 the mesh's
/// model matrix. Fog uses a smoothstep between near and far on view depth.
pub const BAKED_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    fog_color: vec4<f32>,
    // x = near, y = far
    fog_range: vec4<f32>,
};

struct Material {
    color: vec4<f32>,
    // x = 1 when the map should be sampled
    flags: vec4<f32>,
};

struct Model {
    matrix: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var<uniform> material: Material;
@group(1) @binding(1)
var map_texture: texture_2d<f32>;
@group(1) @binding(2)
var map_sampler: sampler;

@group(2) @binding(0)
var<uniform> model: Model;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) depth: f32,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = model.matrix * vec4<f32>(vertex.position, 1.0);
    let view_pos = frame.view * world_pos;

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.uv = vertex.uv;
    out.depth = -view_pos.z;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var base = material.color;
    let texel = textureSample(map_texture, map_sampler, in.uv);
    if (material.flags.x > 0.5) {
        base = base * texel;
    }
    let fog = smoothstep(frame.fog_range.x, frame.fog_range.y, in.depth);
    return vec4<f32>(mix(base.rgb, frame.fog_color.rgb, fog), base.a);
}
"#;
