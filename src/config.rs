//! `.sprig/config.sprig`: a commented `key: value` file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::editor::Keymap;
use crate::tree::Envelope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Envelope used when saving the outline.
    pub envelope: Envelope,
    /// Save the outline when the viewer exits.
    pub autosave: bool,
    pub parent_digit: u8,
    pub child_digit_offset: u8,
    /// Show node ids next to their text in the viewer.
    pub show_ids: bool,
    /// Tracing filter used when `SPRIG_LOG` is not set.
    pub log_level: Option<String>,
    /// Log destination for the viewer. Relative paths resolve against the
    /// workspace root.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let keys = Keymap::default();
        Self {
            envelope: Envelope::Wrapped,
            autosave: true,
            parent_digit: keys.parent_digit,
            child_digit_offset: keys.child_digit_offset,
            show_ids: false,
            log_level: None,
            log_file: None,
        }
    }
}

impl Config {
    pub fn keymap(&self) -> Keymap {
        Keymap {
            parent_digit: self.parent_digit,
            child_digit_offset: self.child_digit_offset,
        }
    }
}

/// Parse config text. Missing keys keep their defaults.
pub fn parse(input: &str) -> Result<Config> {
    let mut config = Config::default();
    for (idx, raw) in input.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            bail!("line {line_num}: expected `key: value`, found {line:?}");
        };
        let key = key.trim();
        let value = value.trim();
        match key {
            "envelope" => {
                config.envelope = Envelope::parse(value).with_context(|| {
                    format!("line {line_num}: envelope must be `wrapped` or `bare`, found {value:?}")
                })?;
            }
            "autosave" => config.autosave = parse_bool(value, key, line_num)?,
            "show_ids" => config.show_ids = parse_bool(value, key, line_num)?,
            "parent_digit" => config.parent_digit = parse_digit(value, key, line_num)?,
            "child_digit_offset" => {
                config.child_digit_offset = parse_digit(value, key, line_num)?
            }
            "log_level" => config.log_level = non_empty(value).map(ToString::to_string),
            "log_file" => config.log_file = non_empty(value).map(PathBuf::from),
            other => bail!("line {line_num}: unknown config key {other:?}"),
        }
    }
    Ok(config)
}

/// Read `path`, or fall back to defaults when it does not exist.
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse(&content).with_context(|| format!("invalid config {}", path.display()))
}

pub fn serialize(config: &Config) -> String {
    let log_level = config.log_level.clone().unwrap_or_default();
    let log_file = config
        .log_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    format!(
        "\
# sprig configuration
# Edit manually or press [c] in `sprig view`

# Snapshot shape written on save
# Options: wrapped | bare
envelope: {}

# Save the outline when leaving the viewer
autosave: {}

# Ctrl+<digit> (or a bare digit) that jumps to the parent node
parent_digit: {}

# Digit d jumps to child number d - child_digit_offset (0-based)
child_digit_offset: {}

# Show node ids in the viewer
show_ids: {}

# Tracing filter when SPRIG_LOG is unset (e.g. info, sprig=debug)
log_level: {}

# Viewer log file (empty = .sprig/sprig.log, only when logging is enabled)
log_file: {}
",
        config.envelope.as_str(),
        config.autosave,
        config.parent_digit,
        config.child_digit_offset,
        config.show_ids,
        log_level,
        log_file,
    )
}

fn parse_bool(value: &str, key: &str, line_num: usize) -> Result<bool> {
    match value {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => bail!("line {line_num}: {key} must be true or false, found {value:?}"),
    }
}

fn parse_digit(value: &str, key: &str, line_num: usize) -> Result<u8> {
    match value.parse::<u8>() {
        Ok(digit) if digit <= 9 => Ok(digit),
        _ => bail!("line {line_num}: {key} must be a digit 0-9, found {value:?}"),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}
