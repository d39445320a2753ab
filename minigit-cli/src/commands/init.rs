use anyhow::{Context, Result};
use colored::Colorize;
use minigit_core::InitOutcome;
use std::path::Path;

pub fn run(dir: &Path) -> Result<()> {
    let mut repository = super::open_repository(dir)?;

    let outcome = repository
        .init()
        .context("Failed to initialize repository")?;

    match outcome {
        InitOutcome::Created => {
            println!("{}", "Initialized empty MiniGit repository.".green())
        }
        InitOutcome::AlreadyInitialized => {
            println!("{}", "Repository already initialized.".yellow())
        }
    }

    Ok(())
}
