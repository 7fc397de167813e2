use crate::tree::NodeId;

/// Everything an editor layer can ask a [`Session`](super::Session) to do,
/// apart from save and load which have their own entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a node under the focused one and focus it.
    CreateChild { value: String },
    /// Splice the focused node out and focus its former parent.
    DeleteFocused,
    GoToParent,
    /// 0-based position among the focused node's children.
    GoToChild(usize),
    /// Replace the focused node's text.
    SetValue(String),
}

impl Command {
    pub fn create_child(value: impl Into<String>) -> Self {
        Self::CreateChild {
            value: value.into(),
        }
    }

    /// Whether the command edits the outline, as opposed to moving focus.
    pub fn modifies_tree(&self) -> bool {
        matches!(
            self,
            Self::CreateChild { .. } | Self::DeleteFocused | Self::SetValue(_)
        )
    }
}

/// What became of an applied command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The command was valid input but had nothing to do (e.g. deleting the
    /// root, navigating past the last child).
    Ignored,
}

/// Notifications for the rendering layer, drained after each command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// Nodes were added, removed or relinked; re-project the whole tree.
    StructureChanged { revision: u64 },
    /// A node's text changed.
    ValueChanged(NodeId),
    /// Move input focus to this node's widget.
    FocusMoved(NodeId),
    /// A snapshot replaced the tree.
    Loaded { nodes: usize },
}
