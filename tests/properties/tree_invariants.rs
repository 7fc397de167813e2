//! Property tests for structural edits.

use std::collections::HashSet;

use proptest::prelude::*;

use sprig::tree::{NodeId, NodeTree, Snapshot};

#[derive(Debug, Clone)]
pub enum Op {
    AddChild(usize, String),
    /// Create a detached node, then attach it under a picked node.
    AddThenAttach(usize, String),
    Delete(usize),
    SetValue(usize, String),
    /// Try to move a picked node under another one; may be rejected.
    Attach(usize, usize),
}

pub fn op() -> impl Strategy<Value = Op> {
    let text = "[a-z ]{0,8}";
    prop_oneof![
        4 => (any::<usize>(), text).prop_map(|(p, v)| Op::AddChild(p, v)),
        1 => (any::<usize>(), text).prop_map(|(p, v)| Op::AddThenAttach(p, v)),
        2 => any::<usize>().prop_map(Op::Delete),
        1 => (any::<usize>(), text).prop_map(|(p, v)| Op::SetValue(p, v)),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Attach(a, b)),
    ]
}

fn pick(tree: &NodeTree, index: usize) -> NodeId {
    let ids: Vec<NodeId> = tree.iter().map(|n| n.id()).collect();
    ids[index % ids.len()]
}

/// Apply `op`, returning any id it created.
pub fn apply(tree: &mut NodeTree, op: &Op) -> Option<NodeId> {
    match op {
        Op::AddChild(p, value) => {
            let parent = pick(tree, *p);
            tree.add_child(parent, value.as_str()).ok()
        }
        Op::AddThenAttach(p, value) => {
            let parent = pick(tree, *p);
            let id = tree.add_node(value.as_str(), None).ok()?;
            tree.attach(id, parent).ok()?;
            Some(id)
        }
        Op::Delete(p) => {
            let id = pick(tree, *p);
            let _ = tree.delete_node(id);
            None
        }
        Op::SetValue(p, value) => {
            let id = pick(tree, *p);
            let _ = tree.set_value(id, value.as_str());
            None
        }
        Op::Attach(a, b) => {
            let child = pick(tree, *a);
            let parent = pick(tree, *b);
            let _ = tree.attach(child, parent);
            None
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every edit sequence leaves one root and consistent links.
    #[test]
    fn property_edits_keep_tree_consistent(ops in prop::collection::vec(op(), 0..64)) {
        let mut tree = NodeTree::new();
        for op in &ops {
            apply(&mut tree, op);
            prop_assert!(tree.validate().is_ok(), "invalid after {:?}", op);
        }
        let parentless = tree.iter().filter(|n| n.parent().is_none()).count();
        prop_assert_eq!(parentless, 1);
        prop_assert_eq!(tree.preorder().len(), tree.len());
    }

    /// PROPERTY: ids are never handed out twice, even after deletions.
    #[test]
    fn property_ids_never_repeat(ops in prop::collection::vec(op(), 0..64)) {
        let mut tree = NodeTree::new();
        let mut seen: HashSet<NodeId> = HashSet::from([tree.root()]);
        for op in &ops {
            if let Some(id) = apply(&mut tree, op) {
                prop_assert!(seen.insert(id), "id {} reused", id);
            }
        }
    }

    /// PROPERTY: a rejected edit leaves the tree exactly as it was.
    #[test]
    fn property_rejected_attach_changes_nothing(
        ops in prop::collection::vec(op(), 1..32),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let mut tree = NodeTree::new();
        for op in &ops {
            apply(&mut tree, op);
        }
        let before = Snapshot::capture(&tree);
        let revision = tree.revision();
        let child = pick(&tree, a);
        let parent = pick(&tree, b);
        if tree.attach(child, parent).is_err() {
            prop_assert_eq!(Snapshot::capture(&tree), before);
            prop_assert_eq!(tree.revision(), revision);
        }
    }

    /// PROPERTY: splicing a node out keeps its children in order at the end
    /// of the parent's list.
    #[test]
    fn property_delete_promotes_children_in_order(
        ops in prop::collection::vec(op(), 1..48),
        target in any::<usize>(),
    ) {
        let mut tree = NodeTree::new();
        for op in &ops {
            apply(&mut tree, op);
        }
        let id = pick(&tree, target);
        prop_assume!(id != tree.root());
        let parent = tree.parent(id).expect("attached node");
        let grandchildren = tree.children(id).to_vec();
        let mut expected: Vec<NodeId> = tree
            .children(parent)
            .iter()
            .copied()
            .filter(|c| *c != id)
            .collect();
        expected.extend(&grandchildren);

        tree.delete_node(id).unwrap();
        prop_assert_eq!(tree.children(parent), expected.as_slice());
        for child in grandchildren {
            prop_assert_eq!(tree.parent(child), Some(parent));
        }
        prop_assert!(!tree.contains(id));
    }
}
