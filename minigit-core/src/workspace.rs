use crate::config::PathMode;
use crate::error::{Error, Result};
use crate::storage::REPO_DIR;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Read-only view of the working directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    ignored: Vec<String>,
}

impl Workspace {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            ignored: vec![REPO_DIR.to_string()],
        }
    }

    pub fn with_ignored<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        for name in names {
            if !self.ignored.contains(&name) {
                self.ignored.push(name);
            }
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a user-supplied path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    /// Whether `path` points into the repository directory itself.
    pub fn is_inside_repository(&self, path: &str) -> Result<bool> {
        let repo_dir = self.root.join(REPO_DIR);
        if !repo_dir.exists() {
            return Ok(false);
        }

        Ok(real_location(&self.resolve(path))?.starts_with(repo_dir.canonicalize()?))
    }

    /// Name under which `path` is kept in staging and snapshots.
    ///
    /// `path` must name an existing file.
    pub fn staged_key(&self, path: &str, mode: PathMode) -> Result<String> {
        let full = self.resolve(path);

        match mode {
            PathMode::Flat => full
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| Error::PathOutsideWorkspace(path.to_string())),
            PathMode::Relative => {
                let root = self.root.canonicalize()?;
                let full = real_location(&full)?;
                let relative = full
                    .strip_prefix(&root)
                    .map_err(|_| Error::PathOutsideWorkspace(path.to_string()))?;

                path_to_key(relative).ok_or_else(|| Error::PathOutsideWorkspace(path.to_string()))
            }
        }
    }

    /// Names present in the working directory, minus ignored ones.
    ///
    /// Flat mode lists top-level entries, directories included. Relative
    /// mode lists every regular file below the root.
    pub fn entries(&self, mode: PathMode) -> Result<BTreeSet<String>> {
        let entries = match mode {
            PathMode::Flat => {
                let mut names = BTreeSet::new();
                for entry in std::fs::read_dir(&self.root)? {
                    let name = entry?.file_name().to_string_lossy().into_owned();
                    if !self.is_ignored(&name) {
                        names.insert(name);
                    }
                }
                names
            }
            PathMode::Relative => {
                let mut keys = BTreeSet::new();
                let walker = WalkDir::new(&self.root)
                    .min_depth(1)
                    .into_iter()
                    .filter_entry(|e| !self.is_ignored(&e.file_name().to_string_lossy()));

                for entry in walker {
                    let entry = entry?;
                    let file_type = entry.file_type();
                    let is_file = file_type.is_file()
                        || (file_type.is_symlink() && entry.path().is_file());
                    if !is_file {
                        continue;
                    }
                    if let Some(key) = entry
                        .path()
                        .strip_prefix(&self.root)
                        .ok()
                        .and_then(path_to_key)
                    {
                        keys.insert(key);
                    }
                }
                keys
            }
        };

        debug!("Working directory has {} entries", entries.len());
        Ok(entries)
    }

    /// Bytes of the file stored under `key`, or `None` when it is missing or
    /// not a regular file.
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = key_path(&self.root, key)?;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(path)?))
    }

    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(key_path(&self.root, key)?.exists())
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignored.iter().any(|ignored| ignored == name)
    }
}

/// Filesystem location of a `/`-separated key below `base`.
pub(crate) fn key_path(base: &Path, key: &str) -> Result<PathBuf> {
    validate_key(key)?;
    Ok(key
        .split('/')
        .fold(base.to_path_buf(), |path, part| path.join(part)))
}

/// Keys come back from `commits.json`, which may have been edited by hand.
/// Only plain names joined by `/` are accepted.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.split('/').all(|part| {
            !part.is_empty()
                && part != "."
                && part != ".."
                && Path::new(part)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)))
        });

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}

/// Canonical form of `path` with its last component left as is, so a
/// symlink keeps its own name.
fn real_location(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::PathOutsideWorkspace(path.display().to_string()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.canonicalize()?,
        _ => std::env::current_dir()?,
    };
    Ok(parent.join(name))
}

/// `/`-separated key for a relative path; `None` if it is empty or climbs out.
pub(crate) fn path_to_key(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
