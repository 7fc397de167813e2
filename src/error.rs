//! Error types for the outline core.
//!
//! The tree, snapshot and session layers return `TreeError`. Commands and the
//! TUI wrap it in `anyhow` with context.

use thiserror::Error;

use crate::tree::NodeId;

/// Result type alias for outline core operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// A structural rule an operation would have broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The root may never be deleted.
    DeleteRoot,
    /// A parentless non-root node has nowhere to splice its children.
    DeleteDetached,
    /// A node cannot become its own parent.
    AttachToSelf,
    /// The root never gets a parent.
    AttachRoot,
    /// The child already hangs under a parent.
    AlreadyAttached,
    /// The new parent sits inside the child's subtree.
    WouldCycle,
    /// An explicit id is already taken.
    DuplicateId,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::DeleteRoot => "the root node cannot be deleted",
            Self::DeleteDetached => "a node without a parent cannot be deleted",
            Self::AttachToSelf => "a node cannot be attached under itself",
            Self::AttachRoot => "the root node cannot be attached under another node",
            Self::AlreadyAttached => "the node already has a parent",
            Self::WouldCycle => "the new parent is a descendant of the node",
            Self::DuplicateId => "the id is already in use",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum TreeError {
    /// Rejected before any mutation took place.
    #[error("invariant violation on node {node}: {violation}")]
    Invariant {
        node: NodeId,
        violation: InvariantViolation,
    },

    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    /// Snapshot content that cannot be reconciled into a valid tree.
    #[error("malformed snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Only one load may be pending at a time.
    #[error("a load is already in progress")]
    LoadInFlight,

    #[error("load ticket {0} is no longer pending")]
    StaleLoadTicket(u64),

    /// Every node id up to `u64::MAX` has been used.
    #[error("no node ids left to allocate")]
    IdsExhausted,
}

impl TreeError {
    pub(crate) fn invariant(node: NodeId, violation: InvariantViolation) -> Self {
        Self::Invariant { node, violation }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            reason: reason.into(),
        }
    }

    /// True for errors that mean "the tree would break".
    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant { .. })
    }
}
