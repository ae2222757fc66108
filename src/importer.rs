use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::dates::resolve_actual_date;
use crate::encoding::read_latin1;
use crate::error::{KasboekError, Result};
use crate::fingerprint::{grouping_key, identity_hash};
use crate::models::{Category, RawRecord, Transaction, RELEVANT_COLUMNS};
use crate::store::{load_store, StoreMap};

/// Result of an import run. Row-level failures never abort the run; they are
/// collected here so the CLI can report them.
pub struct ImportOutcome {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRow>,
    pub failed_files: Vec<(String, KasboekError)>,
}

#[derive(Debug)]
pub struct SkippedRow {
    pub file: String,
    pub line: u64,
    pub error: KasboekError,
}

/// Load raw export files, deduplicate, enrich, and merge in the persisted
/// categorization store.
///
/// Pipeline: concatenate files restricted to the recognized columns, drop
/// exact duplicate raw rows, parse day-first dates, compute the identity
/// hash over the pre-parse amount string, compute the grouping key, left-merge
/// the store (missing entries default to Other / not split), drop duplicate
/// hashes, and resolve the actual timestamp. Each logical transaction appears
/// exactly once in the result.
pub fn load_transactions(files: &[PathBuf], store_path: &Path) -> Result<ImportOutcome> {
    let mut raws: Vec<(String, u64, RawRecord)> = Vec::new();
    let mut failed_files = Vec::new();

    for file in files {
        let name = file.display().to_string();
        match read_raw_file(file) {
            Ok(rows) => raws.extend(rows.into_iter().map(|(line, raw)| (name.clone(), line, raw))),
            // Structural problems sink the whole file, not the import
            Err(e) => failed_files.push((name, e)),
        }
    }

    let mut seen_raw = HashSet::new();
    raws.retain(|(_, _, raw)| seen_raw.insert(raw.clone()));

    let store = load_store(store_path);

    let mut transactions = Vec::new();
    let mut skipped = Vec::new();
    let mut seen_hashes = HashSet::new();
    for (file, line, raw) in raws {
        match enrich(&raw, &store) {
            Ok(txn) => {
                // Rows that differ only in unhashed fields collapse here
                if seen_hashes.insert(txn.hash.clone()) {
                    transactions.push(txn);
                }
            }
            Err(error) => skipped.push(SkippedRow { file, line, error }),
        }
    }

    Ok(ImportOutcome {
        transactions,
        skipped,
        failed_files,
    })
}

/// All files under the raw data directory, recursively, in stable order.
pub fn raw_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    if dir.exists() {
        collect_files(dir, &mut out)?;
        out.sort();
    }
    Ok(out)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn read_raw_file(path: &Path) -> Result<Vec<(u64, RawRecord)>> {
    let content = read_latin1(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    let mut indices = [0usize; RELEVANT_COLUMNS.len()];
    for (slot, column) in indices.iter_mut().zip(RELEVANT_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| KasboekError::MissingColumn {
                file: path.display().to_string(),
                column: column.to_string(),
            })?;
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| record.get(indices[i]).unwrap_or("").to_string();
        rows.push((
            line,
            RawRecord {
                date: field(0),
                description: field(1),
                amount: field(2),
                counterparty_name: field(3),
                counterparty_address: field(4),
                structured_ref: field(5),
                free_ref: field(6),
                balance: field(7),
            },
        ));
    }
    Ok(rows)
}

fn enrich(raw: &RawRecord, store: &StoreMap) -> Result<Transaction> {
    let date = NaiveDate::parse_from_str(raw.date.trim(), "%d/%m/%Y")
        .map_err(|_| KasboekError::BadDate(raw.date.clone()))?;

    // Hash over the pre-parse amount string, then convert for arithmetic
    let hash = identity_hash(&raw.description, date, &raw.amount)?;
    let amount = parse_decimal(&raw.amount)
        .ok_or_else(|| KasboekError::BadAmount(raw.amount.clone()))?;
    let balance = parse_decimal(&raw.balance)
        .ok_or_else(|| KasboekError::BadAmount(raw.balance.clone()))?;

    let (category, split) = store
        .get(&hash)
        .copied()
        .unwrap_or((Category::Other, false));

    Ok(Transaction {
        date,
        description: raw.description.clone(),
        amount,
        raw_amount: raw.amount.clone(),
        counterparty_name: non_empty(&raw.counterparty_name),
        counterparty_address: non_empty(&raw.counterparty_address),
        structured_ref: non_empty(&raw.structured_ref),
        free_ref: non_empty(&raw.free_ref),
        balance,
        hash,
        group: grouping_key(&raw.description),
        actual_date: resolve_actual_date(&raw.description, date),
        category,
        split,
    })
}

/// Comma-decimal to f64. The exports carry no thousands separators.
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
