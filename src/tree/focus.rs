use tracing::trace;

use crate::tree::id::NodeId;
use crate::tree::model::NodeTree;

/// The node currently targeted for editing and navigation.
///
/// Every move goes through [`FocusCursor::focus`], which also records a focus
/// request for the renderer to pick up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusCursor {
    current: NodeId,
    request: Option<NodeId>,
}

impl FocusCursor {
    /// Start at the root of `tree`.
    pub fn new(tree: &NodeTree) -> Self {
        Self {
            current: tree.root(),
            request: Some(tree.root()),
        }
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Move to `id` if it is part of `tree`. Returns whether focus changed.
    pub fn focus(&mut self, tree: &NodeTree, id: NodeId) -> bool {
        if !tree.contains(id) {
            return false;
        }
        self.request = Some(id);
        if self.current == id {
            return false;
        }
        trace!(from = %self.current, to = %id, "focus moved");
        self.current = id;
        true
    }

    /// No-op at the root.
    pub fn go_to_parent(&mut self, tree: &NodeTree) -> bool {
        match tree.parent(self.current) {
            Some(parent) => self.focus(tree, parent),
            None => false,
        }
    }

    /// Focus the `index`-th child (0-based). Out of range is a no-op.
    pub fn go_to_child(&mut self, tree: &NodeTree, index: usize) -> bool {
        match tree.children(self.current).get(index) {
            Some(child) => self.focus(tree, *child),
            None => false,
        }
    }

    /// The node the renderer should move input focus to, once.
    pub fn take_focus_request(&mut self) -> Option<NodeId> {
        self.request.take()
    }

    /// Fall back to the root when the focused node is gone.
    pub fn repair(&mut self, tree: &NodeTree) {
        if !tree.contains(self.current) {
            self.current = tree.root();
            self.request = Some(self.current);
        }
    }
}
