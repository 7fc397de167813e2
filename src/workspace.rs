//! Paths and discovery for the `.sprig/` directory.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

pub const DIR_NAME: &str = ".sprig";

/// Walk upward from `start` to find the directory containing `.sprig/outline.json`.
pub fn find_root_from(start: &Path) -> Result<PathBuf> {
    let mut dir = start;
    loop {
        if outline_path(dir).exists() {
            return Ok(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => bail!("no sprig outline found; run `sprig init` or pass a file path"),
        }
    }
}

/// Walk upward from the current working directory.
pub fn find_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    find_root_from(&cwd)
}

pub fn sprig_dir(root: &Path) -> PathBuf {
    root.join(DIR_NAME)
}

pub fn outline_path(root: &Path) -> PathBuf {
    sprig_dir(root).join("outline.json")
}

pub fn config_path(root: &Path) -> PathBuf {
    sprig_dir(root).join("config.sprig")
}

pub fn default_log_path(root: &Path) -> PathBuf {
    sprig_dir(root).join("sprig.log")
}

/// Where an outline command should read from and which config applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub outline: PathBuf,
    /// Workspace root, when one was found.
    pub root: Option<PathBuf>,
}

impl Target {
    pub fn config_path(&self) -> Option<PathBuf> {
        self.root.as_deref().map(config_path)
    }
}

/// An explicit file wins; otherwise discover the workspace outline.
pub fn resolve(explicit: Option<&Path>) -> Result<Target> {
    let cwd = std::env::current_dir()?;
    resolve_from(&cwd, explicit)
}

pub fn resolve_from(cwd: &Path, explicit: Option<&Path>) -> Result<Target> {
    match explicit {
        Some(path) => {
            let outline = if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            };
            // A file inside `.sprig/` still picks up that workspace's config.
            let root = outline
                .parent()
                .filter(|dir| dir.file_name().is_some_and(|n| n == DIR_NAME))
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .or_else(|| find_root_from(cwd).ok());
            Ok(Target { outline, root })
        }
        None => {
            let root = find_root_from(cwd)?;
            Ok(Target {
                outline: outline_path(&root),
                root: Some(root),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_workspace(dir: &Path) {
        fs::create_dir_all(dir.join(DIR_NAME)).unwrap();
        fs::write(outline_path(dir), "{\"data\":[]}").unwrap();
    }

    #[test]
    fn find_root_from_direct() {
        let dir = TempDir::new().unwrap();
        init_workspace(dir.path());
        let root = find_root_from(dir.path()).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn find_root_from_subdir() {
        let dir = TempDir::new().unwrap();
        init_workspace(dir.path());
        fs::create_dir_all(dir.path().join("notes/deep")).unwrap();
        let root = find_root_from(&dir.path().join("notes/deep")).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn find_root_fails_without_init() {
        let dir = TempDir::new().unwrap();
        assert!(find_root_from(dir.path()).is_err());
    }

    #[test]
    fn explicit_path_is_resolved_against_cwd() {
        let dir = TempDir::new().unwrap();
        let target = resolve_from(dir.path(), Some(Path::new("plan.json"))).unwrap();
        assert_eq!(target.outline, dir.path().join("plan.json"));
        assert_eq!(target.root, None);
        assert_eq!(target.config_path(), None);
    }

    #[test]
    fn explicit_path_inside_workspace_keeps_its_config() {
        let dir = TempDir::new().unwrap();
        init_workspace(dir.path());
        let elsewhere = TempDir::new().unwrap();
        let outline = outline_path(dir.path());
        let target = resolve_from(elsewhere.path(), Some(&outline)).unwrap();
        assert_eq!(target.root.as_deref(), Some(dir.path()));
        assert_eq!(target.config_path(), Some(config_path(dir.path())));
    }

    #[test]
    fn discovery_used_without_explicit_path() {
        let dir = TempDir::new().unwrap();
        init_workspace(dir.path());
        let target = resolve_from(dir.path(), None).unwrap();
        assert_eq!(target.outline, outline_path(dir.path()));
    }
}
