use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{InvariantViolation, TreeError, TreeResult};
use crate::tree::id::{IdAllocator, NodeId};

/// A single note in the outline.
///
/// Relationships are stored as ids into the owning [`NodeTree`], never as
/// handles, so the tree stays the only owner of every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    value: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(id: NodeId, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in display order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The full outline: an arena of nodes keyed by id.
///
/// Collection order (the order nodes were added) is preserved for snapshots.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
    root: NodeId,
    ids: IdAllocator,
    revision: u64,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// A tree holding only an empty root with the first allocated id.
    pub fn new() -> Self {
        let mut tree = Self::empty();
        let root = NodeId::ROOT;
        tree.ids.reserve(root);
        tree.insert(Node::new(root, ""));
        tree.root = root;
        tree
    }

    /// No nodes at all. Only the snapshot loader starts from here.
    pub(crate) fn empty() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            root: NodeId::ROOT,
            ids: IdAllocator::new(),
            revision: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bumped by every structural mutation; the renderer compares it to decide
    /// whether its last projection is stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The id the allocator will hand out next, `None` once ids ran out.
    pub fn next_id(&self) -> Option<NodeId> {
        self.ids.peek()
    }

    pub(crate) fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// Look up a node by id. `None` is a lookup miss, not an error.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut node = self.nodes.get(&id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            depth += 1;
            if depth > self.nodes.len() {
                return None;
            }
        }
        Some(depth)
    }

    /// True when `ancestor` lies on the parent chain of `id` (or is `id`).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        let mut steps = 0;
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Depth-first display order starting at the root, paired with depth.
    pub fn preorder(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            out.push((id, depth));
            for child in node.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }

    /// Create a parentless, childless node.
    ///
    /// With `explicit_id` the id is used verbatim and the allocator moves past
    /// it; otherwise the allocator supplies the next id.
    pub fn add_node(
        &mut self,
        value: impl Into<String>,
        explicit_id: Option<NodeId>,
    ) -> TreeResult<NodeId> {
        let id = match explicit_id {
            Some(id) => id,
            None => self.ids.next()?,
        };
        if self.contains(id) {
            return Err(TreeError::invariant(id, InvariantViolation::DuplicateId));
        }
        self.ids.reserve(id);
        self.insert(Node::new(id, value));
        debug!(node = %id, "node added");
        Ok(id)
    }

    /// Hang `child` under `parent`, appending it to the parent's children.
    ///
    /// Every precondition is checked before anything changes.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> TreeResult<()> {
        let child_node = self.nodes.get(&child).ok_or(TreeError::UnknownNode(child))?;
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        if child == parent {
            return Err(TreeError::invariant(child, InvariantViolation::AttachToSelf));
        }
        if child == self.root {
            return Err(TreeError::invariant(child, InvariantViolation::AttachRoot));
        }
        if child_node.parent.is_some() {
            return Err(TreeError::invariant(
                child,
                InvariantViolation::AlreadyAttached,
            ));
        }
        if self.is_ancestor(child, parent) {
            return Err(TreeError::invariant(child, InvariantViolation::WouldCycle));
        }

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        self.revision += 1;
        debug!(node = %child, parent = %parent, "node attached");
        Ok(())
    }

    /// Create a node directly under `parent`.
    ///
    /// The parent is checked first, so a failure never leaves a detached node
    /// behind.
    pub fn add_child(&mut self, parent: NodeId, value: impl Into<String>) -> TreeResult<NodeId> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        let id = self.add_node(value, None)?;
        self.attach(id, parent)?;
        Ok(id)
    }

    /// Splice a node out of the tree.
    ///
    /// Its children move, in order, to the end of its parent's children list,
    /// so nothing below the deleted node is lost. The root cannot be deleted.
    pub fn delete_node(&mut self, id: NodeId) -> TreeResult<Node> {
        let node = self.nodes.get(&id).ok_or(TreeError::UnknownNode(id))?;
        if id == self.root {
            return Err(TreeError::invariant(id, InvariantViolation::DeleteRoot));
        }
        let Some(parent) = node.parent else {
            return Err(TreeError::invariant(
                id,
                InvariantViolation::DeleteDetached,
            ));
        };
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent));
        }

        let Some(removed) = self.nodes.remove(&id) else {
            return Err(TreeError::UnknownNode(id));
        };
        self.order.retain(|n| *n != id);

        for child in &removed.children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(parent);
            }
        }
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|c| *c != id);
            parent_node.children.extend(removed.children.iter().copied());
        }
        self.revision += 1;
        debug!(
            node = %id,
            parent = %parent,
            promoted = removed.children.len(),
            "node deleted"
        );
        Ok(removed)
    }

    /// Replace a node's text.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> TreeResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::UnknownNode(id))?;
        node.value = value.into();
        Ok(())
    }

    /// Check every structural invariant of the tree.
    pub fn validate(&self) -> TreeResult<()> {
        let roots: Vec<NodeId> = self
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect();
        match roots.as_slice() {
            [only] if *only == self.root => {}
            [] => return Err(TreeError::malformed("no root node")),
            [only] => {
                return Err(TreeError::malformed(format!(
                    "node {only} has no parent but the root is {}",
                    self.root
                )));
            }
            many => {
                let list = many
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(TreeError::malformed(format!(
                    "several nodes have no parent: {list}"
                )));
            }
        }

        for node in self.iter() {
            if let Some(parent) = node.parent {
                let parent_node = self.nodes.get(&parent).ok_or_else(|| {
                    TreeError::malformed(format!("parent {parent} of node {} is missing", node.id))
                })?;
                let listed = parent_node
                    .children
                    .iter()
                    .filter(|c| **c == node.id)
                    .count();
                if listed != 1 {
                    return Err(TreeError::malformed(format!(
                        "node {} is listed {listed} times under its parent {parent}",
                        node.id
                    )));
                }
            }
            for child in &node.children {
                let child_node = self.nodes.get(child).ok_or_else(|| {
                    TreeError::malformed(format!("child {child} of node {} is missing", node.id))
                })?;
                if child_node.parent != Some(node.id) {
                    return Err(TreeError::malformed(format!(
                        "node {child} is listed under {} but names a different parent",
                        node.id
                    )));
                }
            }
        }

        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(TreeError::malformed(format!("node {id} is reachable twice")));
            }
            stack.extend(self.children(id).iter().copied());
        }
        if seen.len() != self.nodes.len() {
            return Err(TreeError::malformed(format!(
                "{} node(s) are not reachable from the root",
                self.nodes.len() - seen.len()
            )));
        }
        Ok(())
    }

    fn insert(&mut self, node: Node) {
        self.order.push(node.id);
        self.nodes.insert(node.id, node);
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (NodeTree, NodeId, NodeId, NodeId) {
        // 0
        // └── 1
        //     ├── 2
        //     └── 3
        let mut tree = NodeTree::new();
        let n = tree.add_child(tree.root(), "n").unwrap();
        let a = tree.add_child(n, "a").unwrap();
        let b = tree.add_child(n, "b").unwrap();
        (tree, n, a, b)
    }

    #[test]
    fn new_tree_has_single_empty_root() {
        let tree = NodeTree::new();
        assert_eq!(tree.root(), NodeId(0));
        assert_eq!(tree.len(), 1);
        let root = tree.get(NodeId(0)).unwrap();
        assert_eq!(root.value(), "");
        assert_eq!(root.parent(), None);
        assert!(root.is_leaf());
        tree.validate().unwrap();
    }

    #[test]
    fn add_node_starts_detached() {
        let mut tree = NodeTree::new();
        let id = tree.add_node("loose", None).unwrap();
        assert_eq!(id, NodeId(1));
        let node = tree.get(id).unwrap();
        assert_eq!(node.parent(), None);
        assert!(node.children().is_empty());
    }

    #[test]
    fn add_node_explicit_id_is_used_verbatim_and_reserved() {
        let mut tree = NodeTree::new();
        let id = tree.add_node("x", Some(NodeId(9))).unwrap();
        assert_eq!(id, NodeId(9));
        assert_eq!(tree.next_id(), Some(NodeId(10)));

        let err = tree.add_node("dup", Some(NodeId(9))).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Invariant {
                violation: InvariantViolation::DuplicateId,
                ..
            }
        ));
    }

    #[test]
    fn attach_links_both_directions() {
        let mut tree = NodeTree::new();
        let id = tree.add_node("child", None).unwrap();
        tree.attach(id, tree.root()).unwrap();
        assert_eq!(tree.parent(id), Some(tree.root()));
        assert_eq!(tree.children(tree.root()), &[id]);
        tree.validate().unwrap();
    }

    #[test]
    fn attach_rejects_self_root_and_cycles() {
        let (mut tree, n, a, _) = sample();
        let loose = tree.add_node("loose", None).unwrap();

        let err = tree.attach(loose, loose).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Invariant {
                violation: InvariantViolation::AttachToSelf,
                ..
            }
        ));

        let err = tree.attach(tree.root(), loose).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Invariant {
                violation: InvariantViolation::AttachRoot,
                ..
            }
        ));

        let err = tree.attach(a, loose).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Invariant {
                violation: InvariantViolation::AlreadyAttached,
                ..
            }
        ));

        tree.attach(loose, a).unwrap();
        tree.validate().unwrap();

        let top = tree.add_node("top", None).unwrap();
        let below = tree.add_node("below", None).unwrap();
        tree.attach(below, top).unwrap();
        let revision = tree.revision();
        let err = tree.attach(top, below).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Invariant {
                violation: InvariantViolation::WouldCycle,
                ..
            }
        ));
        assert_eq!(tree.revision(), revision);
        assert_eq!(tree.parent(top), None);
        assert_eq!(tree.parent(n), Some(tree.root()));
    }

    #[test]
    fn attach_unknown_ids_fail() {
        let mut tree = NodeTree::new();
        assert!(matches!(
            tree.attach(NodeId(5), tree.root()),
            Err(TreeError::UnknownNode(NodeId(5)))
        ));
        let id = tree.add_node("x", None).unwrap();
        assert!(matches!(
            tree.attach(id, NodeId(77)),
            Err(TreeError::UnknownNode(NodeId(77)))
        ));
        assert_eq!(tree.parent(id), None);
    }

    #[test]
    fn delete_splices_children_into_parent_in_order() {
        let (mut tree, n, a, b) = sample();
        let sibling = tree.add_child(tree.root(), "s").unwrap();

        let removed = tree.delete_node(n).unwrap();
        assert_eq!(removed.id(), n);
        assert!(!tree.contains(n));
        assert_eq!(tree.children(tree.root()), &[sibling, a, b]);
        assert_eq!(tree.parent(a), Some(tree.root()));
        assert_eq!(tree.parent(b), Some(tree.root()));
        tree.validate().unwrap();
    }

    #[test]
    fn delete_leaf_removes_only_that_node() {
        let (mut tree, n, a, b) = sample();
        tree.delete_node(a).unwrap();
        assert_eq!(tree.children(n), &[b]);
        assert_eq!(tree.len(), 3);
        tree.validate().unwrap();
    }

    #[test]
    fn delete_root_is_rejected_without_change() {
        let (mut tree, n, a, b) = sample();
        let revision = tree.revision();
        let err = tree.delete_node(tree.root()).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Invariant {
                violation: InvariantViolation::DeleteRoot,
                ..
            }
        ));
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.revision(), revision);
        assert_eq!(tree.children(tree.root()), &[n]);
        assert_eq!(tree.children(n), &[a, b]);
    }

    #[test]
    fn delete_detached_is_rejected() {
        let mut tree = NodeTree::new();
        let loose = tree.add_node("loose", None).unwrap();
        let err = tree.delete_node(loose).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Invariant {
                violation: InvariantViolation::DeleteDetached,
                ..
            }
        ));
        assert!(tree.contains(loose));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut tree = NodeTree::new();
        let first = tree.add_child(tree.root(), "").unwrap();
        tree.delete_node(first).unwrap();
        let second = tree.add_child(tree.root(), "").unwrap();
        assert_ne!(first, second);
        assert_eq!(second, NodeId(2));
    }

    #[test]
    fn depth_and_preorder_follow_display_order() {
        let (tree, n, a, b) = sample();
        assert_eq!(tree.depth(tree.root()), Some(0));
        assert_eq!(tree.depth(b), Some(2));
        assert_eq!(
            tree.preorder(),
            vec![(tree.root(), 0), (n, 1), (a, 2), (b, 2)]
        );
        assert!(tree.is_ancestor(n, b));
        assert!(!tree.is_ancestor(a, b));
    }

    #[test]
    fn set_value_updates_text() {
        let (mut tree, n, _, _) = sample();
        tree.set_value(n, "renamed").unwrap();
        assert_eq!(tree.get(n).unwrap().value(), "renamed");
        assert!(matches!(
            tree.set_value(NodeId(99), "x"),
            Err(TreeError::UnknownNode(NodeId(99)))
        ));
    }

    #[test]
    fn validate_reports_detached_nodes() {
        let mut tree = NodeTree::new();
        tree.add_node("loose", None).unwrap();
        let err = tree.validate().unwrap_err();
        assert!(err.to_string().contains("several nodes have no parent"));
    }
}
