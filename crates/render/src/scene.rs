use glam::Vec3;
use highway_common::{AssetId, NodeId, Transform};
use std::collections::BTreeMap;

/// What a scene node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure transform container.
    Group,
    /// Axis-aligned box strip (road surface, shoulder).
    Strip { size: Vec3, material: AssetId },
    /// Clone of a loaded prototype model.
    ///
    /// `reactive` instances are picked up by the environment lighting pass.
    Instance { prototype: AssetId, reactive: bool },
}

/// A node handed to the scene collaborator. Children are positioned relative
/// to their parent.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(id: NodeId, name: impl Into<String>, transform: Transform) -> Self {
        Self {
            id,
            name: name.into(),
            transform,
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn leaf(name: impl Into<String>, transform: Transform, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            transform,
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes below this one (not counting itself).
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

/// Renderable scene-graph collaborator.
///
/// The streaming core never draws anything. It attaches and detaches whole
/// segment groups here and reports position changes.
pub trait Scene {
    /// Attach a top-level node.
    fn add(&mut self, node: SceneNode);

    /// Detach a top-level node and release whatever the scene allocated for it.
    fn remove(&mut self, id: NodeId) -> Option<SceneNode>;

    /// A top-level node moved. Scenes that read positions lazily can ignore this.
    fn set_transform(&mut self, _id: NodeId, _transform: Transform) {}
}

/// In-memory scene that keeps every attached node.
///
/// Used by the headless driver and by tests to observe what the core attached.
#[derive(Debug, Default)]
pub struct RetainedScene {
    nodes: BTreeMap<NodeId, SceneNode>,
    added: u64,
    removed: u64,
}

impl RetainedScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    /// Every node in the scene, including children.
    pub fn total_node_count(&self) -> usize {
        self.nodes.values().map(|n| 1 + n.descendant_count()).sum()
    }

    /// Lifetime add/remove counters.
    pub fn churn(&self) -> (u64, u64) {
        (self.added, self.removed)
    }
}

impl Scene for RetainedScene {
    fn add(&mut self, node: SceneNode) {
        self.added += 1;
        if self.nodes.insert(node.id, node).is_some() {
            tracing::warn!("node attached twice; previous copy replaced");
        }
    }

    fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let node = self.nodes.remove(&id);
        if node.is_some() {
            self.removed += 1;
        }
        node
    }

    fn set_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.transform = transform;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> SceneNode {
        SceneNode::leaf(
            "road",
            Transform::default(),
            NodeKind::Strip {
                size: Vec3::new(10.0, 0.1, 60.0),
                material: AssetId(1),
            },
        )
    }

    #[test]
    fn descendant_count_is_recursive() {
        let inner = SceneNode::group(NodeId::new(), "shoulder", Transform::default())
            .with_child(strip())
            .with_child(strip());
        let root = SceneNode::group(NodeId::new(), "segment", Transform::default())
            .with_child(inner)
            .with_child(strip());
        assert_eq!(root.descendant_count(), 4);
    }

    #[test]
    fn retained_scene_add_remove() {
        let mut scene = RetainedScene::new();
        let id = NodeId::new();
        scene.add(SceneNode::group(id, "segment", Transform::default()).with_child(strip()));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.total_node_count(), 2);

        let removed = scene.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(scene.is_empty());
        assert!(scene.remove(id).is_none());
        assert_eq!(scene.churn(), (1, 1));
    }

    #[test]
    fn set_transform_updates_attached_node() {
        let mut scene = RetainedScene::new();
        let id = NodeId::new();
        scene.add(SceneNode::group(id, "segment", Transform::default()));
        let moved = Transform::from_translation(Vec3::new(0.0, 0.0, -3.0));
        scene.set_transform(id, moved);
        assert_eq!(scene.get(id).unwrap().transform, moved);

        // Unknown ids are ignored.
        scene.set_transform(NodeId::new(), moved);
        assert_eq!(scene.len(), 1);
    }
}
