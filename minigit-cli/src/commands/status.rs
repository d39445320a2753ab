use anyhow::{Context, Result};
use std::path::Path;

use crate::display;

pub fn run(dir: &Path) -> Result<()> {
    let repository = super::open_repository(dir)?;

    let Some(report) = super::or_report(repository.status())? else {
        return Ok(());
    };

    let mut out = std::io::stdout().lock();
    display::write_status(&mut out, &report).context("Failed to write status")?;

    Ok(())
}
