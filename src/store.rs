use std::collections::HashMap;
use std::path::Path;

use colored::Colorize;

use crate::encoding::{read_latin1, write_latin1};
use crate::error::{KasboekError, Result};
use crate::fingerprint::identity_hash;
use crate::models::{Category, Transaction};

/// Persisted user decisions, keyed by identity hash.
pub type StoreMap = HashMap<String, (Category, bool)>;

const HEADER: [&str; 3] = ["hash", "Category", "Split"];

/// Load the categorization store. Never fails hard: a missing or corrupt
/// file means categorization starts over from defaults, which the user can
/// redo interactively.
pub fn load_store(path: &Path) -> StoreMap {
    let mut map = StoreMap::new();
    if !path.exists() {
        return map;
    }

    let content = match read_latin1(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} store {} unreadable ({e}), starting fresh", "warning:".yellow(), path.display());
            return map;
        }
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                eprintln!("{} skipping corrupt store row: {e}", "warning:".yellow());
                continue;
            }
        };
        if record.len() < 3 {
            continue;
        }
        let hash = record[0].to_string();
        let category = match Category::from_name(&record[1]) {
            Some(c) => c,
            None => {
                eprintln!(
                    "{} unknown category '{}' in store, falling back to Other",
                    "warning:".yellow(),
                    &record[1]
                );
                Category::Other
            }
        };
        let split = parse_flag(&record[2]);

        // Stale duplicate keys can disagree; last-seen wins.
        if let Some((prev, _)) = map.get(&hash) {
            if *prev != category {
                eprintln!(
                    "{} duplicate hash {} in store ({} vs {}), keeping {}",
                    "warning:".yellow(),
                    &hash[..12.min(hash.len())],
                    prev,
                    category,
                    category
                );
            }
        }
        map.insert(hash, (category, split));
    }
    map
}

/// Write the store: identity hash plus the two mutable fields, nothing else.
/// The hash is recomputed from the immutable fields on every save; each save
/// fully replaces the previous file.
pub fn save_store(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADER)?;
    for txn in transactions {
        let hash = identity_hash(&txn.description, txn.date, &txn.raw_amount)?;
        wtr.write_record([
            hash.as_str(),
            txn.category.name(),
            if txn.split { "true" } else { "false" },
        ])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| KasboekError::Other(format!("store write failed: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| KasboekError::Other(format!("store write failed: {e}")))?;
    write_latin1(path, &text)
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "True" | "TRUE" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(description: &str, raw_amount: &str, category: Category, split: bool) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap();
        let hash = identity_hash(description, date, raw_amount).unwrap();
        Transaction {
            date,
            description: description.to_string(),
            amount: raw_amount.replace(',', ".").parse().unwrap(),
            raw_amount: raw_amount.to_string(),
            counterparty_name: None,
            counterparty_address: None,
            structured_ref: None,
            free_ref: None,
            balance: 0.0,
            hash,
            group: crate::fingerprint::grouping_key(description),
            actual_date: date.and_hms_opt(0, 0, 0).unwrap(),
            category,
            split,
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        let rows = vec![
            txn("ALBERT HEIJN 1632", "-42,10", Category::Groceries, false),
            txn("SALARIS MAART", "2500,00", Category::Salary, true),
        ];
        save_store(&path, &rows).unwrap();

        let map = load_store(&path);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&rows[0].hash], (Category::Groceries, false));
        assert_eq!(map[&rows[1].hash], (Category::Salary, true));
    }

    #[test]
    fn test_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_store(&dir.path().join("nope.csv")).is_empty());
    }

    #[test]
    fn test_corrupt_store_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        std::fs::write(&path, "not;a;store\nat@all").unwrap();
        // Rows without the expected shape are dropped, never fatal
        let map = load_store(&path);
        assert!(map.len() <= 1);
    }

    #[test]
    fn test_unknown_category_becomes_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        std::fs::write(&path, "hash,Category,Split\nabc123,Gadgets,true\n").unwrap();
        let map = load_store(&path);
        assert_eq!(map["abc123"], (Category::Other, true));
    }

    #[test]
    fn test_duplicate_hash_last_seen_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        std::fs::write(
            &path,
            "hash,Category,Split\nabc,Groceries,false\nabc,Lunch,true\n",
        )
        .unwrap();
        let map = load_store(&path);
        assert_eq!(map["abc"], (Category::Lunch, true));
    }

    #[test]
    fn test_save_overwrites_previous_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        let many = vec![
            txn("A", "-1,00", Category::Lunch, false),
            txn("B", "-2,00", Category::Rent, false),
        ];
        save_store(&path, &many).unwrap();
        let one = vec![txn("C", "-3,00", Category::Health, true)];
        save_store(&path, &one).unwrap();

        let map = load_store(&path);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&one[0].hash], (Category::Health, true));
    }

    #[test]
    fn test_alternate_boolean_spellings_accepted() {
        assert!(parse_flag("True"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("False"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
