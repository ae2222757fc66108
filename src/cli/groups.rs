use std::collections::HashMap;

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::euro;
use crate::models::Transaction;

/// Cluster by grouping key, keep clusters of two or more rows, largest first.
/// Equal-sized clusters tie-break on their earliest timestamp so repeated
/// runs print the same order.
fn recurring_clusters(transactions: &[Transaction]) -> Vec<Vec<&Transaction>> {
    let mut clusters: HashMap<&str, Vec<&Transaction>> = HashMap::new();
    for txn in transactions {
        clusters.entry(&txn.group).or_default().push(txn);
    }

    let mut recurring: Vec<Vec<&Transaction>> = clusters
        .into_values()
        .filter(|rows| rows.len() >= 2)
        .collect();
    recurring.sort_by_key(|rows| {
        let first_seen = rows.iter().map(|t| t.actual_date).min();
        (std::cmp::Reverse(rows.len()), first_seen)
    });
    recurring
}

pub fn run() -> Result<()> {
    let (_settings, outcome) = super::load_table()?;

    let recurring = recurring_clusters(&outcome.transactions);

    if recurring.is_empty() {
        println!("No recurring groups found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Rows", "First seen", "Description", "Total"]);
    for rows in &recurring {
        let Some(first) = rows.iter().min_by_key(|t| t.actual_date) else {
            continue;
        };
        let total: f64 = rows.iter().map(|t| t.amount).sum();
        let mut description: String = first.description.chars().take(48).collect();
        if description.len() < first.description.len() {
            description.push_str("...");
        }
        table.add_row(vec![
            Cell::new(rows.len()),
            Cell::new(first.actual_date.format("%Y-%m-%d")),
            Cell::new(description),
            Cell::new(euro(total)),
        ]);
    }
    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{grouping_key, identity_hash};
    use crate::models::Category;
    use chrono::NaiveDate;

    fn txn(day: u32, description: &str, raw_amount: &str) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2023, 3, day).unwrap();
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
            hash: identity_hash(description, date, raw_amount).unwrap(),
            group: grouping_key(description),
            actual_date: date.and_hms_opt(0, 0, 0).unwrap(),
            category: Category::Other,
            split: false,
        }
    }

    #[test]
    fn test_recurring_clusters_counts_and_totals() {
        let rows = vec![
            txn(5, "SPOTIFY AB 4f3a9b2c", "-9,99"),
            txn(12, "SPOTIFY AB 77dd00ee", "-9,99"),
            txn(8, "ALBERT HEIJN 1632", "-20,00"),
        ];
        let clusters = recurring_clusters(&rows);
        // The lone supermarket row never clusters
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
        let total: f64 = clusters[0].iter().map(|t| t.amount).sum();
        assert!((total - -19.98).abs() < 1e-9);
        let first_seen = clusters[0].iter().map(|t| t.actual_date).min().unwrap();
        assert_eq!(
            first_seen,
            NaiveDate::from_ymd_opt(2023, 3, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_larger_clusters_sort_first() {
        let rows = vec![
            txn(1, "SPOTIFY AB 4f3a9b2c", "-9,99"),
            txn(2, "SPOTIFY AB 77dd00ee", "-9,99"),
            txn(3, "NS GROEP REIS 111aaa", "-4,40"),
            txn(4, "NS GROEP REIS 222bbb", "-4,40"),
            txn(5, "NS GROEP REIS 333ccc", "-4,40"),
        ];
        let clusters = recurring_clusters(&rows);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 3);
        assert!(clusters[0][0].description.starts_with("NS GROEP"));
    }

    #[test]
    fn test_equal_sized_clusters_order_by_first_seen() {
        let rows = vec![
            txn(10, "NETFLIX BV abc123", "-11,99"),
            txn(20, "NETFLIX BV def456", "-11,99"),
            txn(3, "SPOTIFY AB 4f3a9b2c", "-9,99"),
            txn(17, "SPOTIFY AB 77dd00ee", "-9,99"),
        ];
        let clusters = recurring_clusters(&rows);
        assert_eq!(clusters.len(), 2);
        // Spotify's earliest row (day 3) predates Netflix's (day 10)
        assert!(clusters[0][0].description.starts_with("SPOTIFY"));
        assert!(clusters[1][0].description.starts_with("NETFLIX"));
    }
}
