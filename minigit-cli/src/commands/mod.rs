pub mod add;
pub mod commit;
pub mod help;
pub mod init;
pub mod log;
pub mod status;

use anyhow::{Context, Result};
use colored::Colorize;
use minigit_core::Repository;
use std::path::Path;

pub fn open_repository(dir: &Path) -> Result<Repository> {
    Repository::open(dir)
        .with_context(|| format!("Failed to open repository in {}", dir.display()))
}

/// Unwrap a core result. User errors are printed and yield `None`;
/// anything else is returned as a failure.
pub fn or_report<T>(result: minigit_core::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_user_error() => {
            println!("{}", e.to_string().yellow());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
