use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{self, Config};
use crate::logging;
use crate::tui::canvas;
use crate::workspace::{self, Target};

pub fn run(file: Option<&Path>, demo: bool) -> Result<()> {
    if demo {
        return canvas::run(None, true);
    }
    let target = workspace::resolve(file)?;
    let config = match target.config_path() {
        Some(path) => config::load(&path)?,
        None => Config::default(),
    };
    if let Some(path) = log_destination(&target, &config) {
        logging::init_file(&path, config.log_level.as_deref())?;
    }
    canvas::run(Some(&target), false)
}

/// The viewer owns the terminal, so it only logs to a file, and only when asked.
fn log_destination(target: &Target, config: &Config) -> Option<PathBuf> {
    if !logging::requested(config.log_level.as_deref(), config.log_file.as_deref()) {
        return None;
    }
    if let Some(file) = &config.log_file {
        return Some(match &target.root {
            Some(root) if file.is_relative() => root.join(file),
            _ => file.clone(),
        });
    }
    let root = target
        .root
        .clone()
        .or_else(|| target.outline.parent().map(Path::to_path_buf))?;
    Some(workspace::default_log_path(&root))
}
