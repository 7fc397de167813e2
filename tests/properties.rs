//! Property tests for the outline tree.
//!
//! Random edit sequences check that the tree stays consistent and that
//! snapshots round-trip.
//!
//! Run with: `cargo test --test properties`

#[path = "properties/tree_invariants.rs"]
mod tree_invariants;

#[path = "properties/snapshot_roundtrip.rs"]
mod snapshot_roundtrip;
