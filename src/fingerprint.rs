use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::encoding::latin1_bytes;
use crate::error::{KasboekError, Result};

/// Stable identity digest over a transaction's immutable fields.
///
/// The amount contributes as its pre-parse export string (comma decimal
/// normalized to a dot), divided by 1000 and re-stringified, so re-imports
/// hash identically regardless of how the value is formatted in memory later.
pub fn identity_hash(description: &str, date: NaiveDate, raw_amount: &str) -> Result<String> {
    let amount: f64 = raw_amount
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| KasboekError::BadAmount(raw_amount.to_string()))?;
    let input = format!("{}{}{}", description, date.format("%Y-%m-%d"), amount / 1000.0);
    Ok(digest(&input))
}

/// Fuzzy cluster key for recurring transactions.
///
/// Lowercase, then blank out runs of 3+ hex characters (reference numbers,
/// card tokens), then blank every remaining non-letter. The hex pass must run
/// first or its pattern never matches the already-blanked text.
pub fn grouping_key(description: &str) -> String {
    static HEX_RUN: OnceLock<Regex> = OnceLock::new();
    static NON_LETTER: OnceLock<Regex> = OnceLock::new();
    let hex_run = HEX_RUN.get_or_init(|| Regex::new(r"[a-f0-9]{3,}").unwrap());
    let non_letter = NON_LETTER.get_or_init(|| Regex::new(r"[^a-z]").unwrap());

    let lowered = description.to_lowercase();
    let stripped = hex_run.replace_all(&lowered, " ");
    let normalized = non_letter.replace_all(&stripped, " ");
    digest(&normalized)
}

fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(latin1_bytes(text));
    hex::encode(hasher.finalize())
}
