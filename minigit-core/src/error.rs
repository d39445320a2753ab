use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Not a minigit repository (run 'minigit init' first).")]
    NotARepository(PathBuf),

    #[error("Commit {0} already exists; wait a second and commit again.")]
    CommitIdCollision(String),

    #[error("Path '{0}' is outside the working directory.")]
    PathOutsideWorkspace(String),

    #[error("'{0}' is inside the repository directory and cannot be staged.")]
    PathInsideRepository(String),

    #[error("Invalid file key in repository data: {0:?}")]
    InvalidKey(String),

    #[error("Staged file not found: {0}")]
    StagedFileNotFound(String),

    #[error("Snapshot file not found: {0}")]
    SnapshotNotFound(String),
}

impl Error {
    /// Errors caused by how the tool was invoked rather than by a storage
    /// fault. The CLI prints these and exits normally.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::NotARepository(_)
                | Error::CommitIdCollision(_)
                | Error::PathOutsideWorkspace(_)
                | Error::PathInsideRepository(_)
        )
    }
}
