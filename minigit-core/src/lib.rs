//! # minigit-core
//!
//! Core library for minigit - a minimal local version control tool.
//!
//! Files move from the working directory into a staging area, and from
//! there into immutable, timestamp-identified commit snapshots. This crate
//! provides the storage backends, the repository operations and the status
//! computation; the `minigit` binary is a thin layer on top.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod status;
pub mod storage;
pub mod workspace;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, PathMode};
pub use error::{Error, Result};
pub use models::{AddOutcome, CommitLog, CommitRecord, HistoryEntry, InitOutcome};
pub use repository::Repository;
pub use status::{StatusInputs, StatusReport};
pub use storage::{FsStore, MemoryStore, Store, REPO_DIR};
pub use workspace::Workspace;
