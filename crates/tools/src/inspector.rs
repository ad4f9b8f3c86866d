use bakedscene_common::NodeId;
use bakedscene_render::PerspectiveCamera;
use bakedscene_scene::{Scene, SceneObject};
use glam::Mat4;
use serde::Serialize;

/// Read-only queries against a scene for debugging and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene as seen from `camera`.
    pub fn summary(scene: &Scene, camera: &PerspectiveCamera) -> SceneSummary {
        let mut meshes = 0;
        let mut triangles = 0;
        let mut nodes = 0;
        for (_, fragment) in scene.models() {
            nodes += fragment.node_count();
            fragment.visit(Mat4::IDENTITY, |node, _| {
                if let Some(mesh) = &node.mesh {
                    meshes += 1;
                    triangles += mesh.indices.len() / 3;
                }
            });
        }

        let materials = scene.materials();
        let pending_maps = materials
            .materials()
            .values()
            .filter(|m| m.is_pending())
            .count();
        let fog = scene.fog();
        let p = camera.position;

        SceneSummary {
            children: scene.child_count(),
            models: scene.models().count(),
            nodes,
            meshes,
            triangles,
            materials: materials.len(),
            textures: materials.textures().len(),
            pending_maps,
            fog_color: fog.color.to_hex(),
            fog_near: fog.near,
            fog_far: fog.far,
            camera_position: [p.x, p.y, p.z],
            events: scene.events().len(),
        }
    }

    /// Every node of every attached model, depth-first.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeInfo> {
        let mut out = Vec::new();
        for child in scene.children() {
            let SceneObject::Model(fragment) = &child.object else {
                continue;
            };
            fragment.visit(Mat4::IDENTITY, |node, world| {
                let material = node
                    .material
                    .and_then(|h| scene.materials().get(h))
                    .map(|m| m.name.clone());
                let t = world.w_axis;
                out.push(NodeInfo {
                    model: child.id,
                    name: node.name.clone(),
                    material,
                    triangles: node.mesh.as_ref().map_or(0, |m| m.indices.len() / 3),
                    position: [t.x, t.y, t.z],
                });
            });
        }
        out
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub children: usize,
    pub models: usize,
    pub nodes: usize,
    pub meshes: usize,
    pub triangles: usize,
    pub materials: usize,
    pub textures: usize,
    /// Map materials still waiting for their texture.
    pub pending_maps: usize,
    pub fog_color: String,
    pub fog_near: f32,
    pub fog_far: f32,
    pub camera_position: [f32; 3],
    pub events: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: children={} models={} nodes={} meshes={} tris={} materials={} textures={} pending={} fog={} [{:.1}, {:.1}] camera=({:.2}, {:.2}, {:.2})",
            self.children,
            self.models,
            self.nodes,
            self.meshes,
            self.triangles,
            self.materials,
            self.textures,
            self.pending_maps,
            self.fog_color,
            self.fog_near,
            self.fog_far,
            self.camera_position[0],
            self.camera_position[1],
            self.camera_position[2],
        )
    }
}

/// One node of an attached model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub model: NodeId,
    pub name: String,
    pub material: Option<String>,
    pub triangles: usize,
    pub position: [f32; 3],
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} tris={} material={} pos=({:.2}, {:.2}, {:.2})",
            self.model.short(),
            self.name,
            self.triangles,
            self.material.as_deref().unwrap_or("-"),
            self.position[0],
            self.position[1],
            self.position[2],
        )
    }
}
