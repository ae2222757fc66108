use std::collections::HashMap;

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::euro;
use crate::importer::{load_transactions, raw_files};
use crate::models::Category;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    println!("Data dir:   {}", settings.data_dir().display());
    println!("Raw data:   {}", settings.raw_data_dir().display());
    println!("Store:      {}", settings.store_path().display());

    let files = raw_files(&settings.raw_data_dir())?;
    if files.is_empty() {
        println!();
        println!("No raw exports found. Run `kasboek init` to set up.");
        return Ok(());
    }

    let outcome = load_transactions(&files, &settings.store_path())?;
    super::report_ingest_problems(&outcome);

    let total = outcome.transactions.len();
    let remaining = outcome
        .transactions
        .iter()
        .filter(|t| t.category == Category::Other)
        .count();

    println!();
    println!("Files:        {}", files.len());
    println!("Transactions: {total}");
    println!("Reviewed:     {} / {total}", total - remaining);

    // Spending and income per category, original sign split
    let mut spent: HashMap<Category, f64> = HashMap::new();
    let mut received: HashMap<Category, f64> = HashMap::new();
    let mut counts: HashMap<Category, usize> = HashMap::new();
    for txn in &outcome.transactions {
        *counts.entry(txn.category).or_default() += 1;
        if txn.amount < 0.0 {
            *spent.entry(txn.category).or_default() += txn.amount;
        } else {
            *received.entry(txn.category).or_default() += txn.amount;
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Count", "Spent", "Received"]);
    for cat in Category::ALL {
        let count = counts.get(&cat).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        table.add_row(vec![
            Cell::new(cat.name()),
            Cell::new(count),
            Cell::new(euro(spent.get(&cat).copied().unwrap_or(0.0))),
            Cell::new(euro(received.get(&cat).copied().unwrap_or(0.0))),
        ]);
    }
    println!();
    println!("{table}");
    Ok(())
}
