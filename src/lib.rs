//! sprig: a keyboard-driven outline editor.
//!
//! [`tree`] holds the node arena and its JSON snapshots, [`editor`] applies
//! commands to it, and [`tui`] draws it in the terminal.

pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod logging;
pub mod tree;
pub mod tui;
pub mod workspace;

pub use error::{TreeError, TreeResult};
