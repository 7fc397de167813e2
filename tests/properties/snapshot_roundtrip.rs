//! Property tests for JSON snapshots.

use std::collections::HashSet;

use proptest::prelude::*;

use sprig::TreeError;
use sprig::tree::{Envelope, NodeId, NodeRecord, NodeTree, Snapshot};

use crate::tree_invariants::{apply, op};

fn envelope() -> impl Strategy<Value = Envelope> {
    prop_oneof![Just(Envelope::Wrapped), Just(Envelope::Bare)]
}

fn build(ops: &[crate::tree_invariants::Op]) -> NodeTree {
    let mut tree = NodeTree::new();
    for op in ops {
        apply(&mut tree, op);
    }
    tree
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: loading a saved tree gives back the same ids, values and links.
    #[test]
    fn property_snapshot_round_trips(
        ops in prop::collection::vec(op(), 0..48),
        envelope in envelope(),
    ) {
        let tree = build(&ops);
        let text = tree.to_snapshot().to_json(envelope).unwrap();
        let loaded = NodeTree::from_json(&text).unwrap();

        prop_assert_eq!(loaded.root(), tree.root());
        prop_assert_eq!(loaded.preorder(), tree.preorder());
        prop_assert_eq!(Snapshot::capture(&loaded), Snapshot::capture(&tree));
        prop_assert_eq!(loaded.to_snapshot().to_json(envelope).unwrap(), text);
    }

    /// PROPERTY: the envelope does not change what loads.
    #[test]
    fn property_envelopes_load_identically(ops in prop::collection::vec(op(), 0..32)) {
        let snapshot = build(&ops).to_snapshot();
        let wrapped = NodeTree::from_json(&snapshot.to_json(Envelope::Wrapped).unwrap()).unwrap();
        let bare = NodeTree::from_json(&snapshot.to_json(Envelope::Bare).unwrap()).unwrap();
        prop_assert_eq!(Snapshot::capture(&wrapped), Snapshot::capture(&bare));
    }

    /// PROPERTY: ids added after a load never collide with loaded ones.
    #[test]
    fn property_ids_fresh_after_load(
        ops in prop::collection::vec(op(), 0..32),
        more in prop::collection::vec(op(), 1..16),
    ) {
        let tree = build(&ops);
        let text = tree.to_snapshot().to_json(Envelope::Wrapped).unwrap();
        let mut loaded = NodeTree::from_json(&text).unwrap();
        let mut seen: HashSet<NodeId> = loaded.iter().map(|n| n.id()).collect();
        for op in &more {
            if let Some(id) = apply(&mut loaded, op) {
                prop_assert!(seen.insert(id), "id {} reused after load", id);
            }
        }
    }

    /// PROPERTY: trees rooted anywhere in the id range round-trip, and running
    /// out of ids is an error rather than a wrap-around.
    #[test]
    fn property_high_ids_round_trip(
        base in prop_oneof![any::<u64>(), (u64::MAX - 8)..=u64::MAX],
        adds in 0usize..12,
    ) {
        let root = Snapshot {
            records: vec![NodeRecord {
                id: NodeId(base),
                value: String::new(),
                parent: None,
                children: Vec::new(),
            }],
            envelope: Envelope::Wrapped,
        };
        let mut tree = root.to_tree().unwrap();
        for _ in 0..adds {
            match tree.add_child(tree.root(), "n") {
                Ok(id) => prop_assert!(id.0 > base),
                Err(err) => prop_assert!(matches!(err, TreeError::IdsExhausted)),
            }
        }
        tree.validate().unwrap();

        let text = tree.to_snapshot().to_json(Envelope::Wrapped).unwrap();
        let loaded = NodeTree::from_json(&text).unwrap();
        prop_assert_eq!(Snapshot::capture(&loaded), Snapshot::capture(&tree));
    }

    /// PROPERTY: loading arbitrary text never panics.
    #[test]
    fn property_from_json_never_panics(s in ".{0,128}") {
        let _ = NodeTree::from_json(&s);
    }
}
