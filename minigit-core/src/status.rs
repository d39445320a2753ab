use crate::error::Result;
use std::collections::BTreeSet;

/// Result of a status computation. Every section is sorted by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Everything currently staged.
    pub staged: Vec<String>,
    /// Staged files whose working copy no longer matches the staged bytes.
    pub modified: Vec<String>,
    /// Working entries neither staged nor part of the last commit.
    pub untracked: Vec<String>,
    /// Files of the last commit missing from the working directory.
    pub deleted: Vec<String>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.modified.is_empty()
            && self.untracked.is_empty()
            && self.deleted.is_empty()
    }
}

/// The three name sets status is computed from: the working directory, the
/// staging area and the file list of the most recent commit. Sections are
/// computed independently, so one name may show up in several of them.
#[derive(Clone, Debug, Default)]
pub struct StatusInputs {
    pub working: BTreeSet<String>,
    pub staged: BTreeSet<String>,
    pub last_committed: BTreeSet<String>,
}

impl StatusInputs {
    /// Classify every name.
    ///
    /// `differs(name)` reports whether the working copy of a staged name
    /// differs from its staged copy, or `None` when there is no working
    /// file to compare. `exists(name)` reports whether anything exists at
    /// `name` in the working directory.
    pub fn classify<D, E>(&self, mut differs: D, mut exists: E) -> Result<StatusReport>
    where
        D: FnMut(&str) -> Result<Option<bool>>,
        E: FnMut(&str) -> Result<bool>,
    {
        let staged = self.staged.iter().cloned().collect();

        let mut modified = Vec::new();
        for name in self.staged.intersection(&self.working) {
            if differs(name.as_str())?.unwrap_or(false) {
                modified.push(name.clone());
            }
        }

        let untracked = self
            .working
            .iter()
            .filter(|name| !self.staged.contains(*name) && !self.last_committed.contains(*name))
            .cloned()
            .collect();

        let mut deleted = Vec::new();
        for name in &self.last_committed {
            if !exists(name.as_str())? {
                deleted.push(name.clone());
            }
        }

        Ok(StatusReport {
            staged,
            modified,
            untracked,
            deleted,
        })
    }
}
