//! `sprig list`: print the outline as an indented tree.

use std::path::Path;

use anyhow::Result;

use crate::commands::read_snapshot;
use crate::tree::NodeTree;
use crate::workspace;

pub fn run(file: Option<&Path>) -> Result<()> {
    let target = workspace::resolve(file)?;
    let (_, tree) = read_snapshot(&target.outline)?;
    for line in format_outline(&tree) {
        println!("  {}", line);
    }
    Ok(())
}

/// One line per node in display order: two spaces per level, then `#id value`.
pub fn format_outline(tree: &NodeTree) -> Vec<String> {
    tree.preorder()
        .into_iter()
        .filter_map(|(id, depth)| {
            let node = tree.get(id)?;
            let indent = "  ".repeat(depth);
            Some(if node.value().is_empty() {
                format!("{indent}#{id}")
            } else {
                format!("{indent}#{id} {}", node.value())
            })
        })
        .collect()
}
