use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Prefix shared by every commit id and snapshot directory name.
pub const COMMIT_ID_PREFIX: &str = "commit_";

const ID_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One immutable snapshot as recorded in `commits.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    pub message: String,
    pub timestamp: String,
    pub files: Vec<String>,
}

impl CommitRecord {
    /// Build a record whose id and timestamp both come from the same instant.
    pub fn new(message: impl Into<String>, at: NaiveDateTime, files: Vec<String>) -> Self {
        Self {
            id: Self::id_for(&at),
            message: message.into(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            files,
        }
    }

    /// Commit identity for a wall-clock instant, at second resolution.
    pub fn id_for(at: &NaiveDateTime) -> String {
        format!("{}{}", COMMIT_ID_PREFIX, at.format(ID_FORMAT))
    }

    pub fn files_joined(&self) -> String {
        self.files.join(", ")
    }
}

/// Append-only commit index. Insertion order is commit order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitLog {
    records: Vec<CommitRecord>,
}

impl CommitLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CommitRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&CommitRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Records from newest to oldest, each paired with its 1-based position
    /// in commit order (oldest = 1).
    pub fn history(&self) -> impl Iterator<Item = HistoryEntry<'_>> {
        self.records
            .iter()
            .enumerate()
            .rev()
            .map(|(i, record)| HistoryEntry {
                number: i + 1,
                record,
            })
    }

    /// Files of the most recent commit, empty when nothing was committed yet.
    pub fn last_committed_files(&self) -> &[String] {
        self.last().map(|r| r.files.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry<'a> {
    pub number: usize,
    pub record: &'a CommitRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyInitialized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// `path` was copied into staging under `key`.
    Staged { path: String, key: String },
    /// `path` does not name an existing file; nothing was staged.
    Missing(String),
}
