use crate::types::{MaterialHandle, Transform};
use glam::Mat4;

/// CPU-side triangle mesh: positions, one UV set, and a u32 index list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Append another mesh, rebasing its indices past the current vertices.
    /// Missing UVs are padded with zeros so both arrays stay the same length.
    pub fn append(&mut self, other: MeshData) {
        let base = self.positions.len() as u32;
        self.uvs.resize(self.positions.len(), [0.0, 0.0]);
        let mut uvs = other.uvs;
        uvs.resize(other.positions.len(), [0.0, 0.0]);
        self.positions.extend(other.positions);
        self.uvs.extend(uvs);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }
}

/// A named node of a loaded model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<MeshData>,
    pub material: Option<MaterialHandle>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Visit this node and its descendants with their world matrices.
    pub fn visit<'a>(&'a self, parent: Mat4, f: &mut impl FnMut(&'a ModelNode, Mat4)) {
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.visit(world, f);
        }
    }
}

/// The scene-graph fragment produced by loading a model file: the root nodes
/// of its default scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelFragment {
    pub name: String,
    pub children: Vec<ModelNode>,
}

impl ModelFragment {
    /// First direct child with exactly this name.
    pub fn find_child(&self, name: &str) -> Option<&ModelNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut ModelNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Number of direct children carrying this name.
    pub fn count_named(&self, name: &str) -> usize {
        self.children.iter().filter(|c| c.name == name).count()
    }

    /// Visit every node of the fragment with its world matrix.
    pub fn visit<'a>(&'a self, root: Mat4, mut f: impl FnMut(&'a ModelNode, Mat4)) {
        for child in &self.children {
            child.visit(root, &mut f);
        }
    }

    /// Total number of nodes, including nested ones.
    pub fn node_count(&self) -> usize {
        let mut n = 0;
        self.visit(Mat4::IDENTITY, |_, _| n += 1);
        n
    }
}
