//! CPU-side frame preparation: uniform layouts, vertex interleaving and the
//! flattened draw list. Nothing here touches the GPU.

use bakedscene_common::{Color, MaterialHandle, MeshData, NodeId};
use bakedscene_materials::Material;
use bakedscene_render::PerspectiveCamera;
use bakedscene_scene::{Fog, Scene};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub fog_color: [f32; 4],
    pub fog_range: [f32; 4],
}

impl FrameUniforms {
    pub fn new(camera: &PerspectiveCamera, fog: &Fog) -> Self {
        let [r, g, b] = fog.color.to_linear();
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            fog_color: [r, g, b, 1.0],
            fog_range: [fog.near, fog.far, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub color: [f32; 4],
    pub flags: [f32; 4],
}

impl MaterialUniforms {
    /// `has_map` is whether a texture is actually bound; a pending map
    /// material draws its plain color until then.
    pub fn new(material: &Material, has_map: bool) -> Self {
        let [r, g, b] = material.color.to_linear();
        Self {
            color: [r, g, b, 1.0],
            flags: [if has_map { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelUniforms {
    pub matrix: [[f32; 4]; 4],
}

/// Interleave positions and uvs. Vertices without a uv get (0, 0).
pub fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

/// One mesh to draw.
#[derive(Debug, Clone)]
pub struct DrawItem<'a> {
    pub model: NodeId,
    pub node: &'a str,
    pub world: Mat4,
    pub mesh: &'a MeshData,
    pub material: Option<MaterialHandle>,
}

/// Every non-empty mesh of every attached model, in scene order.
pub fn collect_draws(scene: &Scene) -> Vec<DrawItem<'_>> {
    let mut draws = Vec::new();
    for (model, fragment) in scene.models() {
        fragment.visit(Mat4::IDENTITY, |node, world| {
            let Some(mesh) = &node.mesh else { return };
            if mesh.is_empty() || mesh.indices.is_empty() {
                return;
            }
            draws.push(DrawItem {
                model,
                node: &node.name,
                world,
                mesh,
                material: node.material,
            });
        });
    }
    draws
}

/// Clear color in the linear space the sRGB surface expects.
pub fn clear_color(color: Color) -> wgpu::Color {
    let [r, g, b] = color.to_linear();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakedscene_common::{ModelFragment, ModelNode, Transform};
    use bakedscene_materials::MaterialLibrary;
    use glam::Vec3;

    fn triangle() -> MeshData {
        MeshData {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            uvs: vec![[0.0, 0.0], [1.0, 0.0]],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 160);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 32);
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 64);
    }

    #[test]
    fn interleave_pads_missing_uvs() {
        let verts = interleave(&triangle());
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[1].uv, [1.0, 0.0]);
        assert_eq!(verts[2].uv, [0.0, 0.0]);
        assert_eq!(verts[2].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn frame_uniforms_carry_fog_range() {
        let u = FrameUniforms::new(&PerspectiveCamera::default(), &Fog::default());
        assert_eq!(u.fog_range[..2], [1.0, 28.0]);
        // #263740 in linear light
        assert!(u.fog_color[0] > 0.0 && u.fog_color[0] < 0.03);
        assert_eq!(u.fog_color[3], 1.0);
    }

    #[test]
    fn pending_map_material_draws_flat() {
        let lib = MaterialLibrary::baked_scene();
        let baked = lib.materials().values().next().unwrap();
        assert!(baked.is_pending());
        let u = MaterialUniforms::new(baked, false);
        assert_eq!(u.flags[0], 0.0);
        assert_eq!(u.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(MaterialUniforms::new(baked, true).flags[0], 1.0);
    }

    #[test]
    fn collect_draws_skips_nodes_without_geometry() {
        let mut scene = Scene::new();
        scene.add_camera("camera");
        let mut window = ModelNode::named("window");
        window.mesh = Some(triangle());
        window.transform = Transform {
            position: Vec3::new(2.0, 0.0, 0.0),
            ..Transform::default()
        };
        let id = scene.add_model(ModelFragment {
            name: "house".into(),
            children: vec![ModelNode::named("empty"), window],
        });

        let draws = collect_draws(&scene);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].model, id);
        assert_eq!(draws[0].node, "window");
        assert_eq!(draws[0].world.w_axis.truncate(), Vec3::new(2.0, 0.0, 0.0));
        assert!(draws[0].material.is_none());
    }

    #[test]
    fn clear_color_is_linear() {
        let c = clear_color(Color::WHITE);
        assert_eq!((c.r, c.g, c.b, c.a), (1.0, 1.0, 1.0, 1.0));
        let black = clear_color(Color::from_rgb(0, 0, 0));
        assert_eq!(black.r, 0.0);
    }
}
