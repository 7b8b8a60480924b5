//! Re-orders the rows shown in the transactions table by one of its columns.
//!
//! A column is compared numerically when every value in it parses as a finite
//! number, and as text otherwise. Words such as "inf" and "nan" count as text.

use std::{cmp::Ordering, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// The columns of the transactions table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    /// The transaction ID, the order transactions were created in.
    #[default]
    Id,
    /// The timestamp.
    Date,
    /// The category name.
    Category,
    /// Income or expense.
    Kind,
    /// The amount of money.
    Amount,
}

impl SortColumn {
    /// All columns, in the order they are displayed.
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Id,
        SortColumn::Date,
        SortColumn::Category,
        SortColumn::Kind,
        SortColumn::Amount,
    ];

    /// The lowercase name used in query strings and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Date => "date",
            SortColumn::Category => "category",
            SortColumn::Kind => "kind",
            SortColumn::Amount => "amount",
        }
    }

    /// The text shown in the table cell for this column.
    pub fn value(self, transaction: &Transaction) -> String {
        match self {
            SortColumn::Id => transaction.id.to_string(),
            SortColumn::Date => transaction.date_string(),
            SortColumn::Category => transaction.category.clone(),
            SortColumn::Kind => transaction.kind.to_string(),
            SortColumn::Amount => transaction.amount.to_string(),
        }
    }
}

impl Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == text.trim().to_lowercase())
            .ok_or_else(|| format!("unknown column \"{text}\""))
    }
}

/// The direction to sort in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortOrder {
    /// The opposite order.
    pub fn reverse(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Sort `transactions` in place by `column`.
///
/// The sort is stable, so rows with equal values keep their relative order.
pub fn sort_transactions(transactions: &mut [Transaction], column: SortColumn, order: SortOrder) {
    let mut keyed: Vec<(String, Transaction)> = transactions
        .iter()
        .map(|transaction| (column.value(transaction), transaction.clone()))
        .collect();

    let numbers: Option<Vec<f64>> = keyed
        .iter()
        .map(|(value, _)| value.parse::<f64>().ok().filter(|number| number.is_finite()))
        .collect();

    match numbers {
        Some(numbers) => {
            let mut indexed: Vec<(f64, Transaction)> = numbers
                .into_iter()
                .zip(keyed.into_iter().map(|(_, transaction)| transaction))
                .collect();
            indexed.sort_by(|(a, _), (b, _)| directed(a.total_cmp(b), order));
            copy_back(transactions, indexed.into_iter().map(|(_, row)| row));
        }
        None => {
            keyed.sort_by(|(a, _), (b, _)| directed(a.cmp(b), order));
            copy_back(transactions, keyed.into_iter().map(|(_, row)| row));
        }
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn copy_back(transactions: &mut [Transaction], sorted: impl Iterator<Item = Transaction>) {
    for (slot, transaction) in transactions.iter_mut().zip(sorted) {
        *slot = transaction;
    }
}
