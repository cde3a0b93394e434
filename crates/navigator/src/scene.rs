//! Scene graph capability.
//!
//! An arena of named nodes with parent links, standing in for the renderer's
//! object tree. Names come from the asset pipeline and are only unique within
//! one shelf model. Lookups are synchronous and bounded by node count.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::Rgb;

/// Handle to a node inside one `SceneGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Group,
    Mesh,
}

/// Authoring-side tag on the two halves of a book mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartRole {
    Inner,
    Outer,
}

/// XYZ Euler angles in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Local transform of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Euler,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Euler::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: Transform,
    /// Base color of the node's material, if it has a readable one
    pub color: Option<Rgb>,
    pub role: Option<PartRole>,
}

/// Serializable tree form of a scene graph (asset export format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNodeDesc {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<PartRole>,
    #[serde(default)]
    pub children: Vec<SceneNodeDesc>,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    /// New graph with a single root group
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: vec![SceneNode {
                name: root_name.to_string(),
                kind: NodeKind::Group,
                parent: None,
                children: Vec::new(),
                transform: Transform::default(),
                color: None,
                role: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.to_string(),
            kind,
            parent: Some(parent),
            children: Vec::new(),
            transform: Transform::default(),
            color: None,
            role: None,
        });
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        id
    }

    /// Append a group under `parent`
    pub fn add_group(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.push(parent, name, NodeKind::Group)
    }

    /// Append a mesh under `parent`
    pub fn add_mesh(&mut self, parent: NodeId, name: &str, color: Option<Rgb>) -> NodeId {
        let id = self.push(parent, name, NodeKind::Mesh);
        self.nodes[id.0].color = color;
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.node(id).map(|n| n.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(node) = self.node_mut(id) {
            node.transform = transform;
        }
    }

    pub fn set_role(&mut self, id: NodeId, role: PartRole) {
        if let Some(node) = self.node_mut(id) {
            node.role = Some(role);
        }
    }

    /// Every descendant of `root` (inclusive), pre-order, children in insertion order.
    ///
    /// Two traversals of an unmutated graph always yield the same sequence.
    pub fn traverse(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// First node named `name` in traversal order under `root`
    pub fn get_object_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.traverse(root)
            .into_iter()
            .find(|id| self.name(*id) == Some(name))
    }

    /// Direct child of `parent` named `name`
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)?
            .children
            .iter()
            .copied()
            .find(|id| self.name(*id) == Some(name))
    }

    /// Build from the tree form
    pub fn from_desc(desc: &SceneNodeDesc) -> Self {
        let mut graph = Self::new(&desc.name);
        let root = graph.root();
        if let Some(node) = graph.node_mut(root) {
            node.transform = desc.transform;
        }
        for child in &desc.children {
            graph.attach_desc(root, child);
        }
        graph
    }

    fn attach_desc(&mut self, parent: NodeId, desc: &SceneNodeDesc) {
        let id = self.push(parent, &desc.name, desc.kind);
        if let Some(node) = self.node_mut(id) {
            node.transform = desc.transform;
            node.color = desc.color;
            node.role = desc.role;
        }
        for child in &desc.children {
            self.attach_desc(id, child);
        }
    }

    /// Load from JSON in the tree form
    pub fn from_json(json: &str) -> Result<Self, String> {
        let desc: SceneNodeDesc =
            serde_json::from_str(json).map_err(|e| format!("Scene JSON parse error: {e}"))?;
        Ok(Self::from_desc(&desc))
    }
}
