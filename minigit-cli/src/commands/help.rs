use anyhow::Result;

use crate::display;

pub fn run() -> Result<()> {
    println!("{}", display::HELP);
    Ok(())
}
