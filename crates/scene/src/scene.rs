use bakedscene_common::{Color, MaterialHandle, ModelFragment, NodeId};
use bakedscene_materials::MaterialLibrary;
use serde::{Deserialize, Serialize};

/// Default fog/clear color of the scene.
pub const DEFAULT_FOG_COLOR: Color = Color::from_u32(0x263740);

/// An event record produced by every mutation to the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// A child object was attached at the top level.
    ChildAdded { id: NodeId, name: String },
    /// A model node received a material during assembly.
    MaterialAssigned {
        node: String,
        material: MaterialHandle,
    },
    /// The fog color changed.
    FogColorChanged { old: Color, new: Color },
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: DEFAULT_FOG_COLOR,
            near: 1.0,
            far: 28.0,
        }
    }
}

impl Fog {
    /// Fog amount at a view-space depth: 0 before `near`, 1 past `far`,
    /// smoothstep in between.
    pub fn factor(&self, depth: f32) -> f32 {
        if self.far <= self.near {
            return if depth >= self.far { 1.0 } else { 0.0 };
        }
        let t = ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

/// What a top-level scene child is.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    /// Marker for the viewing camera; the camera itself lives with the viewer.
    Camera,
    /// An attached model fragment.
    Model(ModelFragment),
}

/// A top-level child of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneChild {
    pub id: NodeId,
    pub name: String,
    pub object: SceneObject,
}

/// The scene graph: top-level children, fog, and the materials they use.
///
/// All mutations go through explicit operations and are logged.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    children: Vec<SceneChild>,
    fog: Fog,
    materials: MaterialLibrary,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    /// An empty scene with default fog and no materials.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty scene using the given fog and material library.
    pub fn with_materials(fog: Fog, materials: MaterialLibrary) -> Self {
        Self {
            fog,
            materials,
            ..Self::default()
        }
    }

    pub fn fog(&self) -> &Fog {
        &self.fog
    }

    /// Change the fog color. Returns false if it already had that color.
    pub fn set_fog_color(&mut self, color: Color) -> bool {
        let old = self.fog.color;
        if old == color {
            return false;
        }
        self.fog.color = color;
        self.event_log
            .push(SceneEvent::FogColorChanged { old, new: color });
        true
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    /// Attach the camera marker. Returns its id.
    pub fn add_camera(&mut self, name: impl Into<String>) -> NodeId {
        self.add_child(name.into(), SceneObject::Camera)
    }

    /// Attach a model fragment as a single child. Returns its id.
    pub fn add_model(&mut self, fragment: ModelFragment) -> NodeId {
        let name = fragment.name.clone();
        self.add_child(name, SceneObject::Model(fragment))
    }

    fn add_child(&mut self, name: String, object: SceneObject) -> NodeId {
        let id = NodeId::new();
        self.event_log.push(SceneEvent::ChildAdded {
            id,
            name: name.clone(),
        });
        self.children.push(SceneChild { id, name, object });
        id
    }

    pub(crate) fn record(&mut self, event: SceneEvent) {
        self.event_log.push(event);
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> &[SceneChild] {
        &self.children
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneChild> {
        self.children.iter().find(|c| c.id == id)
    }

    /// Attached model fragments, in attachment order.
    pub fn models(&self) -> impl Iterator<Item = (NodeId, &ModelFragment)> {
        self.children.iter().filter_map(|c| match &c.object {
            SceneObject::Model(fragment) => Some((c.id, fragment)),
            SceneObject::Camera => None,
        })
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakedscene_common::ModelNode;

    #[test]
    fn scene_starts_empty_with_default_fog() {
        let scene = Scene::new();
        assert_eq!(scene.child_count(), 0);
        assert_eq!(scene.fog().color.to_hex(), "#263740");
        assert_eq!(scene.fog().near, 1.0);
        assert_eq!(scene.fog().far, 28.0);
    }

    #[test]
    fn fog_factor_ramps_between_near_and_far() {
        let fog = Fog::default();
        assert_eq!(fog.factor(0.5), 0.0);
        assert_eq!(fog.factor(28.0), 1.0);
        assert_eq!(fog.factor(100.0), 1.0);
        let mid = fog.factor(14.5);
        assert!((mid - 0.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_fog_is_a_step() {
        let fog = Fog {
            near: 5.0,
            far: 5.0,
            ..Fog::default()
        };
        assert_eq!(fog.factor(4.9), 0.0);
        assert_eq!(fog.factor(5.0), 1.0);
    }

    #[test]
    fn set_fog_color_is_idempotent() {
        let mut scene = Scene::new();
        let teal = Color::from_hex("#2a9d8f").unwrap();
        assert!(scene.set_fog_color(teal));
        assert!(!scene.set_fog_color(teal));
        assert_eq!(scene.fog().color, teal);
        assert_eq!(scene.events().len(), 1);
    }

    #[test]
    fn add_children_and_iterate_models() {
        let mut scene = Scene::new();
        let cam = scene.add_camera("camera");
        let model = scene.add_model(ModelFragment {
            name: "house".into(),
            children: vec![ModelNode::named("bakedModel")],
        });

        assert_eq!(scene.child_count(), 2);
        assert!(matches!(scene.get(cam).unwrap().object, SceneObject::Camera));
        let models: Vec<_> = scene.models().collect();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].0, model);
        assert_eq!(models[0].1.name, "house");
    }

    #[test]
    fn drain_events_clears_log() {
        let mut scene = Scene::new();
        scene.add_camera("camera");
        let events = scene.drain_events();
        assert_eq!(events.len(), 1);
        assert!(scene.events().is_empty());
    }
}
