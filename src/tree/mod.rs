//! The outline tree: id allocation, the node arena, focus and snapshots.

pub mod focus;
pub mod id;
pub mod model;
pub mod snapshot;

pub use focus::FocusCursor;
pub use id::{IdAllocator, NodeId};
pub use model::{Node, NodeTree};
pub use snapshot::{Envelope, NodeRecord, Snapshot};
