use crate::models::{Category, Transaction};

/// In-memory review state: the enriched table plus a cursor into the current
/// display order. All category mutation during a session goes through here.
///
/// Navigation works on sequence positions within the display order, never on
/// stored absolute indices, so re-sorting between saves cannot mis-target a
/// row.
pub struct ReviewSession {
    transactions: Vec<Transaction>,
    order: Vec<usize>,
    cursor: Option<usize>,
}

impl ReviewSession {
    /// Build a session with rows displayed in actual-date order.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let mut order: Vec<usize> = (0..transactions.len()).collect();
        order.sort_by_key(|&i| transactions[i].actual_date);
        let mut session = Self {
            transactions,
            order,
            cursor: None,
        };
        session.advance();
        session
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Rows still carrying the default category.
    pub fn remaining(&self) -> usize {
        self.transactions
            .iter()
            .filter(|t| t.category == Category::Other)
            .count()
    }

    pub fn selected(&self) -> Option<&Transaction> {
        self.cursor.map(|pos| &self.transactions[self.order[pos]])
    }

    /// Other rows sharing the selected row's grouping key, display order.
    pub fn similar(&self) -> Vec<&Transaction> {
        let Some(current) = self.selected() else {
            return Vec::new();
        };
        let group = current.group.clone();
        let hash = current.hash.clone();
        self.order
            .iter()
            .map(|&i| &self.transactions[i])
            .filter(|t| t.group == group && t.hash != hash)
            .collect()
    }

    /// Assign category and split flag to the selected row.
    pub fn assign(&mut self, category: Category, split: bool) {
        if let Some(pos) = self.cursor {
            let txn = &mut self.transactions[self.order[pos]];
            txn.category = category;
            txn.split = split;
        }
    }

    /// Assign to the selected row and every row in its group. Returns how
    /// many rows changed.
    pub fn assign_to_group(&mut self, category: Category, split: bool) -> usize {
        let Some(current) = self.selected() else {
            return 0;
        };
        let group = current.group.clone();
        let mut changed = 0;
        for txn in &mut self.transactions {
            if txn.group == group {
                txn.category = category;
                txn.split = split;
                changed += 1;
            }
        }
        changed
    }

    /// Move to the first unreviewed row in display order; when everything is
    /// categorized, step to the next sequence position instead.
    pub fn advance(&mut self) {
        let unreviewed = self
            .order
            .iter()
            .position(|&i| self.transactions[i].category == Category::Other);
        self.cursor = match unreviewed {
            Some(pos) => Some(pos),
            None => match self.cursor {
                Some(pos) if pos + 1 < self.order.len() => Some(pos + 1),
                Some(_) => None,
                None => {
                    if self.order.is_empty() {
                        None
                    } else {
                        Some(0)
                    }
                }
            },
        };
    }

    /// Skip the selected row without touching it.
    pub fn skip(&mut self) {
        self.cursor = match self.cursor {
            Some(pos) if pos + 1 < self.order.len() => Some(pos + 1),
            _ => None,
        };
    }
}
