use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(dir: &Path, message: &str) -> Result<()> {
    let repository = super::open_repository(dir)?;

    let Some(record) = super::or_report(repository.commit(message))? else {
        return Ok(());
    };

    println!("{} {}", "Committed:".green().bold(), record.message);

    Ok(())
}
