use std::path::PathBuf;

use crate::error::Result;
use crate::export::write_export;

pub fn run(output: Option<String>) -> Result<()> {
    let (settings, outcome) = super::load_table()?;

    let path = output.map(PathBuf::from).unwrap_or_else(|| settings.export_path());
    write_export(&path, &outcome.transactions)?;

    println!(
        "{} transactions exported to {}",
        outcome.transactions.len(),
        path.display()
    );
    Ok(())
}
