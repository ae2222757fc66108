use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// Best-available timestamp for a transaction.
///
/// Point-of-sale and ATM descriptions embed the real moment of payment as
/// `DD-MM-YYYY OM HH.MM UUR`, which can differ from the posting date by days.
/// Only the first match counts; anything unparseable falls back to the
/// posting date at midnight.
pub fn resolve_actual_date(description: &str, posting_date: NaiveDate) -> NaiveDateTime {
    static STAMP: OnceLock<Regex> = OnceLock::new();
    let stamp = STAMP
        .get_or_init(|| Regex::new(r"(\d{2}-\d{2}-\d{4}) OM (\d{2}\.\d{2}) UUR").unwrap());

    if let Some(caps) = stamp.captures(description) {
        let text = format!("{} {}", &caps[1], &caps[2]);
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&text, "%d-%m-%Y %H.%M") {
            return parsed;
        }
    }
    posting_date.and_time(NaiveTime::MIN)
}
