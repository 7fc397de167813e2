pub mod check;
pub mod fmt;
pub mod init;
pub mod list;
pub mod view;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config;
use crate::tree::{NodeTree, Snapshot};
use crate::workspace;

/// Read and rebuild the snapshot at `path`.
pub(crate) fn read_snapshot(path: &Path) -> Result<(Snapshot, NodeTree)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot = Snapshot::from_json(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let tree = snapshot
        .to_tree()
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok((snapshot, tree))
}

/// `log_level` from the workspace config that applies to `file`.
///
/// Any problem finding or reading the config yields `None`; the command
/// itself reports it once logging is up.
pub fn configured_log_level(file: Option<&Path>) -> Option<String> {
    let cwd = std::env::current_dir().ok()?;
    configured_log_level_from(&cwd, file)
}

fn configured_log_level_from(cwd: &Path, file: Option<&Path>) -> Option<String> {
    let target = workspace::resolve_from(cwd, file).ok()?;
    let config = config::load(&target.config_path()?).ok()?;
    config.log_level
}
