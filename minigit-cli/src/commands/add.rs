use anyhow::Result;
use colored::Colorize;
use minigit_core::AddOutcome;
use std::path::Path;

pub fn run(dir: &Path, filename: &str) -> Result<()> {
    let repository = super::open_repository(dir)?;

    let Some(outcome) = super::or_report(repository.add(filename))? else {
        return Ok(());
    };

    match outcome {
        AddOutcome::Staged { path, .. } => {
            println!("Added '{}' to staging area.", path.green());
        }
        AddOutcome::Missing(path) => {
            println!("File '{}' does not exist.", path.red());
        }
    }

    Ok(())
}
