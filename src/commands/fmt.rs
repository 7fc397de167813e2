//! `sprig fmt`: rewrite a snapshot in canonical form.

use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use crossterm::style::Stylize;
use tracing::info;

use crate::commands::read_snapshot;
use crate::tree::{Envelope, NodeTree};
use crate::workspace;

pub fn run(file: Option<&Path>, bare: bool, check: bool) -> Result<()> {
    let target = workspace::resolve(file)?;
    let envelope = if bare {
        Envelope::Bare
    } else {
        Envelope::Wrapped
    };
    let path = &target.outline;

    let current = fs::read_to_string(path)?;
    let formatted = format_file(path, envelope)?;
    if formatted == current {
        println!("  {} {}", "Unchanged".dark_grey(), path.display());
        return Ok(());
    }
    if check {
        bail!("{} is not formatted", path.display());
    }
    fs::write(path, formatted)?;
    info!(path = %path.display(), envelope = envelope.as_str(), "snapshot rewritten");
    println!("  {} {}", "Formatted".green().bold(), path.display());
    Ok(())
}

/// The canonical text for the snapshot at `path`. The file must load cleanly.
pub fn format_file(path: &Path, envelope: Envelope) -> Result<String> {
    let (_, tree) = read_snapshot(path)?;
    canonical(&tree, envelope)
}

pub fn canonical(tree: &NodeTree, envelope: Envelope) -> Result<String> {
    Ok(tree.to_snapshot().to_json_pretty(envelope)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COMPACT: &str = r#"{"data":[{"id":0,"value":"","parent":-1,"children":[1]},{"id":1,"value":"","parent":0,"children":[]}]}"#;

    fn write(dir: &TempDir, text: &str) -> std::path::PathBuf {
        let path = dir.path().join("outline.json");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn check_flags_unformatted_file_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, COMPACT);
        assert!(run(Some(&path), false, true).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), COMPACT);
    }

    #[test]
    fn rewrite_is_stable() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, COMPACT);
        run(Some(&path), false, false).unwrap();
        let once = fs::read_to_string(&path).unwrap();
        assert!(once.ends_with("}\n"));
        run(Some(&path), false, true).unwrap();
    }

    #[test]
    fn bare_flag_drops_the_envelope() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, COMPACT);
        run(Some(&path), true, false).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.trim_start().starts_with('['));
        let tree = NodeTree::from_json(&text).unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn missing_parent_field_is_filled_in() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"[{"id":0,"children":[]}]"#);
        let text = format_file(&path, Envelope::Wrapped).unwrap();
        assert!(text.contains("\"parent\": -1"));
        assert!(text.contains("\"value\": \"\""));
    }
}
