use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// Column headers the bank puts on its semicolon-delimited exports. Files may
/// carry extra columns; only these are read.
pub const RELEVANT_COLUMNS: [&str; 8] = [
    "Datum",
    "Omschrijving",
    "Bedrag",
    "Naam tegenpartij",
    "Adres tegenpartij",
    "gestructureerde mededeling",
    "Vrije mededeling",
    "Saldo",
];

/// One raw export row, untouched strings in column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawRecord {
    pub date: String,
    pub description: String,
    pub amount: String,
    pub counterparty_name: String,
    pub counterparty_address: String,
    pub structured_ref: String,
    pub free_ref: String,
    pub balance: String,
}

/// An enriched transaction as held in memory during a review session.
///
/// `raw_amount` keeps the pre-parse decimal string because the identity hash
/// is defined over it; everything except `category` and `split` is immutable
/// after import.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub raw_amount: String,
    pub counterparty_name: Option<String>,
    pub counterparty_address: Option<String>,
    pub structured_ref: Option<String>,
    pub free_ref: Option<String>,
    pub balance: f64,
    pub hash: String,
    pub group: String,
    pub actual_date: NaiveDateTime,
    pub category: Category,
    pub split: bool,
}

/// The closed category set. Extending it means redeploying; the two
/// misspellings are kept as-is so existing stores keep matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Other,
    Groceries,
    CreditCard,
    Lunch,
    Rent,
    Salary,
    Utilities,
    EatingOut,
    Dates,
    Clothes,
    CoffeeSnacks,
    Transport,
    Health,
    Entertainment,
    Reinbursement,
    Reinbursable,
    Paypal,
}

impl Category {
    pub const ALL: [Category; 17] = [
        Category::Other,
        Category::Groceries,
        Category::CreditCard,
        Category::Lunch,
        Category::Rent,
        Category::Salary,
        Category::Utilities,
        Category::EatingOut,
        Category::Dates,
        Category::Clothes,
        Category::CoffeeSnacks,
        Category::Transport,
        Category::Health,
        Category::Entertainment,
        Category::Reinbursement,
        Category::Reinbursable,
        Category::Paypal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Other => "Other",
            Category::Groceries => "Groceries",
            Category::CreditCard => "Credit card",
            Category::Lunch => "Lunch",
            Category::Rent => "Rent",
            Category::Salary => "Salary",
            Category::Utilities => "Utilities",
            Category::EatingOut => "Eating out",
            Category::Dates => "Dates",
            Category::Clothes => "Clothes",
            Category::CoffeeSnacks => "Coffee/snacks",
            Category::Transport => "Transport",
            Category::Health => "Health",
            Category::Entertainment => "Entertainment",
            Category::Reinbursement => "Reinbursement",
            Category::Reinbursable => "Reinbursable",
            Category::Paypal => "Paypal",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
