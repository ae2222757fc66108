use std::path::Path;

use crate::encoding::write_latin1;
use crate::error::{KasboekError, Result};
use crate::models::{Transaction, RELEVANT_COLUMNS};

/// Write the reviewed table back out as a bank-style export: semicolon
/// delimited, Latin-1, day/month/year dates, split flag as 0/1. The derived
/// grouping key and resolved timestamp are internal and stay out of the file.
pub fn write_export(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    let mut header: Vec<&str> = RELEVANT_COLUMNS.to_vec();
    header.push("Category");
    header.push("Split");
    wtr.write_record(&header)?;

    for txn in transactions {
        wtr.write_record([
            txn.date.format("%d/%m/%Y").to_string(),
            txn.description.clone(),
            txn.amount.to_string(),
            txn.counterparty_name.clone().unwrap_or_default(),
            txn.counterparty_address.clone().unwrap_or_default(),
            txn.structured_ref.clone().unwrap_or_default(),
            txn.free_ref.clone().unwrap_or_default(),
            txn.balance.to_string(),
            txn.category.name().to_string(),
            if txn.split { "1" } else { "0" }.to_string(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| KasboekError::Other(format!("export write failed: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| KasboekError::Other(format!("export write failed: {e}")))?;
    write_latin1(path, &text)
}
