//! Editing commands on top of the outline tree.
//!
//! A [`Session`] is the application context: it owns one tree and its focus,
//! applies [`Command`]s, and queues [`EditorEvent`]s for the renderer.

pub mod command;
pub mod keymap;
pub mod session;

pub use command::{Command, EditorEvent, Outcome};
pub use keymap::Keymap;
pub use session::{LoadTicket, Session};
