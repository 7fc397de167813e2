//! `sprig init`: create `.sprig/` with an empty outline and default config.

use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use crossterm::style::Stylize;
use tracing::info;

use crate::config::{self, Config};
use crate::tree::{Envelope, NodeTree};
use crate::workspace;

pub fn run(force: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    run_in(&root, force)
}

/// Set up a workspace inside `root`. An existing outline is only replaced
/// with `force`; an existing config is always kept.
pub fn run_in(root: &Path, force: bool) -> Result<()> {
    let outline = workspace::outline_path(root);
    if outline.exists() && !force {
        bail!(
            "sprig is already initialised ({} exists). Pass --force to start over.",
            outline.display()
        );
    }

    fs::create_dir_all(workspace::sprig_dir(root))?;

    let text = NodeTree::new().to_snapshot().to_json_pretty(Envelope::Wrapped)?;
    fs::write(&outline, text)?;
    info!(path = %outline.display(), "outline created");
    println!("  {} .sprig/outline.json", "Created".green().bold());

    let config_path = workspace::config_path(root);
    if config_path.exists() {
        println!("  {} .sprig/config.sprig", "Kept".yellow().bold());
    } else {
        fs::write(&config_path, config::serialize(&Config::default()))?;
        println!("  {} .sprig/config.sprig", "Created".green().bold());
    }

    println!(
        "  {} {}",
        "Next".cyan().bold(),
        "run `sprig view` to start editing".dark_grey()
    );
    Ok(())
}
