//! `sprig check`: load a snapshot and report on its shape.

use std::path::Path;

use anyhow::Result;
use crossterm::style::Stylize;

use crate::commands::read_snapshot;
use crate::tree::{Envelope, NodeTree};
use crate::workspace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub nodes: usize,
    pub leaves: usize,
    /// Deepest level below the root (the root alone is 0).
    pub depth: usize,
    pub envelope: Envelope,
}

pub fn run(file: Option<&Path>) -> Result<()> {
    let target = workspace::resolve(file)?;
    let (snapshot, tree) = read_snapshot(&target.outline)?;
    let report = summarize(&tree, snapshot.envelope);
    println!("  {} {}", "OK".green().bold(), target.outline.display());
    println!(
        "  {} nodes, {} leaves, depth {}, {} envelope",
        report.nodes, report.leaves, report.depth, report.envelope.as_str()
    );
    Ok(())
}

pub fn summarize(tree: &NodeTree, envelope: Envelope) -> CheckReport {
    let order = tree.preorder();
    CheckReport {
        nodes: tree.len(),
        leaves: tree.iter().filter(|n| n.is_leaf()).count(),
        depth: order.iter().map(|(_, depth)| *depth).max().unwrap_or(0),
        envelope,
    }
}
