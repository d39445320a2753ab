use anyhow::{Context, Result};
use std::path::Path;

use crate::display;

pub fn run(dir: &Path) -> Result<()> {
    let repository = super::open_repository(dir)?;

    let Some(log) = super::or_report(repository.log())? else {
        return Ok(());
    };

    let mut out = std::io::stdout().lock();
    display::write_history(&mut out, &log).context("Failed to write commit history")?;

    Ok(())
}
