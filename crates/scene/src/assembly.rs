use crate::scene::{Scene, SceneEvent};
use bakedscene_common::{ModelFragment, NodeId};
use bakedscene_materials::MaterialSlot;

/// A node the house model must contain and the material it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredNode {
    pub name: &'static str,
    pub slot: MaterialSlot,
}

/// Every node assembly expects, in the order they are checked.
pub const REQUIRED_NODES: [RequiredNode; 5] = [
    RequiredNode {
        name: "bakedModel",
        slot: MaterialSlot::Baked,
    },
    RequiredNode {
        name: "bakedEnv",
        slot: MaterialSlot::BakedEnvironment,
    },
    RequiredNode {
        name: "window",
        slot: MaterialSlot::PoleLight,
    },
    RequiredNode {
        name: "poleLightA",
        slot: MaterialSlot::PoleLight,
    },
    RequiredNode {
        name: "poleLightB",
        slot: MaterialSlot::PoleLight,
    },
];

/// Errors from attaching a loaded model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("missing expected node: {0}")]
    MissingNode(&'static str),
    #[error("scene has no {} material", .0.name())]
    MissingMaterial(MaterialSlot),
}

/// Required names with no direct child of that name, in check order.
pub fn missing_nodes(fragment: &ModelFragment) -> Vec<&'static str> {
    REQUIRED_NODES
        .iter()
        .filter(|req| fragment.find_child(req.name).is_none())
        .map(|req| req.name)
        .collect()
}

/// Assign the baked materials to the model's named nodes and attach it.
///
/// Every required name is checked before anything changes, so on error the
/// scene is left exactly as it was. On success the fragment becomes one new
/// scene child and only the five required nodes have had their material set.
pub fn assemble(scene: &mut Scene, mut fragment: ModelFragment) -> Result<NodeId, AssemblyError> {
    let missing = missing_nodes(&fragment);
    if let Some(first) = missing.first() {
        tracing::error!(
            "model {:?} is missing expected nodes: {}",
            fragment.name,
            missing.join(", ")
        );
        return Err(AssemblyError::MissingNode(*first));
    }

    let mut assignments = Vec::with_capacity(REQUIRED_NODES.len());
    for req in &REQUIRED_NODES {
        let handle = scene
            .materials()
            .slot(req.slot)
            .ok_or(AssemblyError::MissingMaterial(req.slot))?;
        assignments.push((req.name, handle));
    }

    for (name, handle) in assignments {
        if fragment.count_named(name) > 1 {
            tracing::debug!("model has several nodes named {name}; using the first");
        }
        if let Some(node) = fragment.find_child_mut(name) {
            node.material = Some(handle);
            scene.record(SceneEvent::MaterialAssigned {
                node: name.to_string(),
                material: handle,
            });
        }
    }

    let id = scene.add_model(fragment);
    tracing::info!("attached model as scene child {}", id.short());
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Fog;
    use bakedscene_common::{MaterialHandle, ModelNode};
    use bakedscene_materials::MaterialLibrary;

    fn house(names: &[&str]) -> ModelFragment {
        ModelFragment {
            name: "house".into(),
            children: names.iter().map(|n| ModelNode::named(*n)).collect(),
        }
    }

    fn all_names() -> Vec<&'static str> {
        REQUIRED_NODES.iter().map(|r| r.name).collect()
    }

    fn baked_scene() -> Scene {
        Scene::with_materials(Fog::default(), MaterialLibrary::baked_scene())
    }

    fn material_of(scene: &Scene, id: NodeId, name: &str) -> Option<MaterialHandle> {
        match &scene.get(id).unwrap().object {
            crate::SceneObject::Model(f) => f.find_child(name).unwrap().material,
            crate::SceneObject::Camera => None,
        }
    }

    #[test]
    fn all_nodes_present_attaches_one_child() {
        let mut scene = baked_scene();
        scene.add_camera("camera");
        let before = scene.child_count();

        let id = assemble(&mut scene, house(&all_names())).unwrap();
        assert_eq!(scene.child_count(), before + 1);

        let lib = scene.materials();
        for req in &REQUIRED_NODES {
            assert_eq!(material_of(&scene, id, req.name), lib.slot(req.slot));
        }
    }

    #[test]
    fn only_required_nodes_are_touched() {
        let mut scene = baked_scene();
        let mut names = all_names();
        names.push("bench");
        let id = assemble(&mut scene, house(&names)).unwrap();

        assert_eq!(material_of(&scene, id, "bench"), None);
        let assigned = scene
            .events()
            .iter()
            .filter(|e| matches!(e, SceneEvent::MaterialAssigned { .. }))
            .count();
        assert_eq!(assigned, 5);
    }

    #[test]
    fn pole_lights_share_one_material() {
        let mut scene = baked_scene();
        let id = assemble(&mut scene, house(&all_names())).unwrap();
        let a = material_of(&scene, id, "poleLightA");
        assert_eq!(a, material_of(&scene, id, "poleLightB"));
        assert_eq!(a, material_of(&scene, id, "window"));
        assert_ne!(a, material_of(&scene, id, "bakedModel"));
    }

    #[test]
    fn missing_pole_light_b_is_reported() {
        let mut scene = baked_scene();
        let names: Vec<_> = all_names()
            .into_iter()
            .filter(|n| *n != "poleLightB")
            .collect();

        let err = assemble(&mut scene, house(&names)).unwrap_err();
        assert_eq!(err, AssemblyError::MissingNode("poleLightB"));
        assert_eq!(err.to_string(), "missing expected node: poleLightB");
        assert_eq!(scene.child_count(), 0);
        assert!(scene.events().is_empty());
    }

    #[test]
    fn each_missing_name_fails_without_mutation() {
        for req in &REQUIRED_NODES {
            let mut scene = baked_scene();
            let names: Vec<_> = all_names()
                .into_iter()
                .filter(|n| *n != req.name)
                .collect();
            assert_eq!(
                assemble(&mut scene, house(&names)),
                Err(AssemblyError::MissingNode(req.name))
            );
            assert_eq!(scene.child_count(), 0);
        }
    }

    #[test]
    fn first_missing_name_in_check_order_wins() {
        let fragment = house(&["bakedModel", "window"]);
        assert_eq!(
            missing_nodes(&fragment),
            vec!["bakedEnv", "poleLightA", "poleLightB"]
        );
        let mut scene = baked_scene();
        assert_eq!(
            assemble(&mut scene, fragment),
            Err(AssemblyError::MissingNode("bakedEnv"))
        );
    }

    #[test]
    fn nested_nodes_do_not_satisfy_lookup() {
        let mut root = ModelNode::named("root");
        root.children = all_names().into_iter().map(ModelNode::named).collect();
        let fragment = ModelFragment {
            name: "house".into(),
            children: vec![root],
        };
        assert_eq!(missing_nodes(&fragment).len(), 5);
    }

    #[test]
    fn duplicate_names_assign_first_only() {
        let mut scene = baked_scene();
        let mut names = all_names();
        names.push("window");
        assemble(&mut scene, house(&names)).unwrap();
        let (_, fragment) = scene.models().next().unwrap();
        assert!(fragment.children[2].material.is_some());
        assert!(fragment.children[5].material.is_none());
    }

    #[test]
    fn scene_without_materials_fails_cleanly() {
        let mut scene = Scene::new();
        assert_eq!(
            assemble(&mut scene, house(&all_names())),
            Err(AssemblyError::MissingMaterial(MaterialSlot::Baked))
        );
        assert_eq!(scene.child_count(), 0);
    }
}
