use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};

/// Identity of a node. Assigned once and never reused within a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic counter handing out node ids, starting at 0.
///
/// Once `u64::MAX` has been handed out or reserved the allocator is exhausted
/// and [`IdAllocator::next`] fails instead of wrapping.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: Option<u64>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: Some(0) }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> TreeResult<NodeId> {
        let id = self.next.ok_or(TreeError::IdsExhausted)?;
        self.next = id.checked_add(1);
        Ok(NodeId(id))
    }

    /// The id the next call to [`IdAllocator::next`] will return, if any.
    pub fn peek(&self) -> Option<NodeId> {
        self.next.map(NodeId)
    }

    /// Continue allocation at `to`.
    pub fn reset(&mut self, to: u64) {
        self.next = Some(to);
    }

    /// Continue allocation just above `last`. Used after a bulk load.
    pub fn reset_after(&mut self, last: NodeId) {
        self.next = last.0.checked_add(1);
    }

    /// Make sure `id` can never be handed out again.
    pub(crate) fn reserve(&mut self, id: NodeId) {
        if let Some(next) = self.next
            && id.0 >= next
        {
            self.next = id.0.checked_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_without_gaps() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next().unwrap(), NodeId(0));
        assert_eq!(ids.next().unwrap(), NodeId(1));
        assert_eq!(ids.next().unwrap(), NodeId(2));
        assert_eq!(ids.peek(), Some(NodeId(3)));
    }

    #[test]
    fn reset_continues_from_given_value() {
        let mut ids = IdAllocator::new();
        ids.next().unwrap();
        ids.reset(42);
        assert_eq!(ids.next().unwrap(), NodeId(42));
        assert_eq!(ids.next().unwrap(), NodeId(43));
    }

    #[test]
    fn reserve_never_moves_backwards() {
        let mut ids = IdAllocator::new();
        ids.reset(10);
        ids.reserve(NodeId(3));
        assert_eq!(ids.peek(), Some(NodeId(10)));
        ids.reserve(NodeId(12));
        assert_eq!(ids.peek(), Some(NodeId(13)));
    }

    #[test]
    fn last_id_is_handed_out_once_then_exhausted() {
        let mut ids = IdAllocator::new();
        ids.reset(u64::MAX);
        assert_eq!(ids.next().unwrap(), NodeId(u64::MAX));
        assert_eq!(ids.peek(), None);
        assert!(matches!(ids.next(), Err(TreeError::IdsExhausted)));
        assert!(matches!(ids.next(), Err(TreeError::IdsExhausted)));
    }

    #[test]
    fn reserving_the_largest_id_exhausts() {
        let mut ids = IdAllocator::new();
        ids.reserve(NodeId(u64::MAX));
        assert!(matches!(ids.next(), Err(TreeError::IdsExhausted)));

        let mut ids = IdAllocator::new();
        ids.reset_after(NodeId(u64::MAX));
        assert_eq!(ids.peek(), None);
    }
}
