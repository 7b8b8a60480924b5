//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize, Serializer};
use time::{
    Date, PrimitiveDateTime,
    format_description::BorrowedFormatItem,
    macros::{format_description, time},
};

use crate::{Error, config::Config, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// An income or expense entry.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened.
    #[serde(serialize_with = "serialize_timestamp")]
    pub date: PrimitiveDateTime,
    /// The category the transaction is filed under, e.g. "food".
    pub category: String,
    /// Whether money was earned or spent.
    pub kind: TransactionKind,
    /// The amount of money earned or spent. Never negative.
    pub amount: f64,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        date: PrimitiveDateTime,
        category: &str,
        kind: TransactionKind,
        amount: f64,
    ) -> TransactionBuilder {
        TransactionBuilder {
            date,
            category: category.to_owned(),
            kind,
            amount,
        }
    }

    /// The transaction date in the canonical `YYYY-MM-DD HH:MM:SS` format.
    pub fn date_string(&self) -> String {
        format_timestamp(self.date)
    }
}

/// Which way the money went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// All kinds, in the order they are offered to the user.
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Income, TransactionKind::Expense];

    /// The lowercase name used in storage, forms and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The text did not name a [TransactionKind].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a transaction kind, expected \"income\" or \"expense\"")]
pub struct UnknownTransactionKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownTransactionKind;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(UnknownTransactionKind(text.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A builder for creating or replacing [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use time::macros::datetime;
///
/// use crate::transaction::{Transaction, TransactionKind};
///
/// let transaction = Transaction::build(
///         datetime!(2025-01-15 08:30:00),
///         "food",
///         TransactionKind::Expense,
///         45.99,
///     )
///     .validate(&config)?;
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// When the transaction happened, in local time.
    pub date: PrimitiveDateTime,

    /// The category of the transaction.
    ///
    /// Must be one of the configured categories when the transaction is
    /// created. Existing transactions keep their category even if it is later
    /// removed from the config.
    pub category: String,

    /// Whether money was earned or spent.
    pub kind: TransactionKind,

    /// The amount of money, always recorded as a positive number.
    pub amount: f64,
}

impl TransactionBuilder {
    /// Check the builder against the current settings before writing it to the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] or [Error::NegativeAmount] if the amount is not a finite, non-negative number,
    /// - or [Error::UnknownCategory] if the category is not in `config`.
    pub fn validate(self, config: &Config) -> Result<Self, Error> {
        let builder = self.validate_amount()?;

        if !config.has_category(&builder.category) {
            return Err(Error::UnknownCategory(builder.category));
        }

        Ok(builder)
    }

    /// Check the builder that replaces a transaction currently filed under `current_category`.
    ///
    /// An edit may keep a category that has since been removed from `config`,
    /// any other category must be configured.
    ///
    /// # Errors
    /// Same as [TransactionBuilder::validate].
    pub fn validate_edit(self, current_category: &str, config: &Config) -> Result<Self, Error> {
        if self.category == current_category {
            self.validate_amount()
        } else {
            self.validate(config)
        }
    }

    /// Check only the amount, for edits that keep a category which is no longer configured.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] or [Error::NegativeAmount] if the amount is not a finite,
    /// non-negative number.
    pub fn validate_amount(self) -> Result<Self, Error> {
        if !self.amount.is_finite() {
            return Err(Error::InvalidAmount(self.amount.to_string()));
        }

        if self.amount < 0.0 {
            return Err(Error::NegativeAmount(self.amount));
        }

        Ok(self)
    }
}

/// An inclusive range of calendar days used to filter transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Create a range covering every day from `start` to `end`, including both.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }

        Ok(Self { start, end })
    }

    /// The first day of the range.
    pub fn start(&self) -> Date {
        self.start
    }

    /// The last day of the range.
    pub fn end(&self) -> Date {
        self.end
    }

    /// The first and last instants of the range as canonical timestamps.
    fn bounds(&self) -> (String, String) {
        (
            format_timestamp(self.start.midnight()),
            format_timestamp(PrimitiveDateTime::new(self.end, time!(23:59:59))),
        )
    }
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Formats accepted from user input, tried in order.
const INPUT_TIMESTAMP_FORMATS: [&[BorrowedFormatItem<'_>]; 4] = [
    TIMESTAMP_FORMAT,
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The years that fit the four digit year of the canonical format.
const YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// Every timestamp is stored in this zero-padded format so that comparing the
/// stored text gives the same order as comparing the dates.
pub fn format_timestamp(timestamp: PrimitiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).unwrap_or_else(|error| {
        tracing::error!("could not format timestamp {timestamp}: {error}");
        timestamp.to_string()
    })
}

/// Parse a user supplied timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the `YYYY-MM-DDTHH:MM[:SS]` format produced by
/// HTML datetime inputs, or a bare `YYYY-MM-DD` which is read as midnight.
///
/// # Errors
/// Returns [Error::InvalidTimestamp] if `text` matches none of the formats or
/// the year is not between 0 and 9999.
pub fn parse_timestamp(text: &str) -> Result<PrimitiveDateTime, Error> {
    let trimmed = text.trim();

    INPUT_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(trimmed, *format).ok())
        .or_else(|| {
            Date::parse(trimmed, DATE_FORMAT)
                .ok()
                .map(|date| date.midnight())
        })
        .filter(|timestamp| YEARS.contains(&timestamp.year()))
        .ok_or_else(|| Error::InvalidTimestamp(text.to_owned()))
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns [Error::InvalidTimestamp] if `text` is not a valid date or the year
/// is not between 0 and 9999.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT)
        .ok()
        .filter(|date| YEARS.contains(&date.year()))
        .ok_or_else(|| Error::InvalidTimestamp(text.to_owned()))
}

/// Parse the text entered for an amount of money.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if `text` is not a finite number,
/// - or [Error::NegativeAmount] if the number is below zero.
pub fn parse_amount(text: &str) -> Result<f64, Error> {
    match text.trim().parse::<f64>() {
        Ok(amount) if !amount.is_finite() => Err(Error::InvalidAmount(text.to_owned())),
        Ok(amount) if amount < 0.0 => Err(Error::NegativeAmount(amount)),
        Ok(amount) => Ok(amount),
        Err(_) => Err(Error::InvalidAmount(text.to_owned())),
    }
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &PrimitiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(*timestamp))
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str = "SELECT id, date, category, kind, amount FROM transactions";

/// Create a new transaction in the database from a builder.
///
/// The builder is written as is, callers should [TransactionBuilder::validate] user input first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO transactions (date, category, kind, amount)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, date, category, kind, amount",
        )?
        .query_row(
            (
                format_timestamp(builder.date),
                builder.category,
                builder.kind,
                builder.amount,
            ),
            map_transaction_row,
        )?;

    tracing::debug!("Created transaction {}", transaction.id);

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve every transaction, ordered by ID.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?
        .query_map([], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Retrieve the transactions dated within `range`, ordered by ID.
///
/// Both ends of the range are inclusive and the last day is covered up to
/// the final second.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_transactions_between(
    range: &DateRange,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (start, end) = range.bounds();

    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE date BETWEEN ?1 AND ?2 ORDER BY id"
        ))?
        .query_map([start, end], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Retrieve all transactions, or only those in `range` if one is given.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_transactions(
    range: Option<&DateRange>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    match range {
        Some(range) => get_transactions_between(range, connection),
        None => get_all_transactions(connection),
    }
}

/// Replace every field of the transaction `id` with the values in `builder`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "UPDATE transactions
             SET date = ?1, category = ?2, kind = ?3, amount = ?4
             WHERE id = ?5
             RETURNING id, date, category, kind, amount",
        )?
        .query_row(
            (
                format_timestamp(builder.date),
                builder.category,
                builder.kind,
                builder.amount,
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })?;

    tracing::debug!("Updated transaction {id}");

    Ok(transaction)
}

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    tracing::debug!("Deleted transaction {id}");

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                kind TEXT NOT NULL,
                amount REAL NOT NULL
                )",
        (),
    )?;

    // Used by the date range filter.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_date: String = row.get(1)?;
    let date = PrimitiveDateTime::parse(&raw_date, TIMESTAMP_FORMAT)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(error)))?;
    let category = row.get(2)?;
    let kind = row.get(3)?;
    let amount = row.get(4)?;

    Ok(Transaction {
        id,
        date,
        category,
        kind,
        amount,
    })
}

// ============================================================================
// TESTS
// ============================================================================



#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::{date, datetime};

    use crate::{
        Error,
        db::initialize,
        transaction::{
            DateRange, Transaction, TransactionKind, count_transactions, create_transaction,
            delete_transaction, get_all_transactions, get_transaction, get_transactions_between,
            update_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            Transaction::build(
                datetime!(2025-10-05 14:30:00),
                "food",
                TransactionKind::Expense,
                12.3,
            ),
            &conn,
        )
        .expect("could not create transaction");

        assert_eq!(
            transaction,
            Transaction {
                id: 1,
                date: datetime!(2025-10-05 14:30:00),
                category: "food".to_owned(),
                kind: TransactionKind::Expense,
                amount: 12.3,
            }
        );
    }

    #[test]
    fn insert_adds_exactly_one_row_with_fresh_id() {
        let conn = get_test_connection();
        let first = create_transaction(
            Transaction::build(
                datetime!(2025-10-01 08:00:00),
                "food",
                TransactionKind::Expense,
                5.0,
            ),
            &conn,
        )
        .unwrap();

        let second = create_transaction(
            Transaction::build(
                datetime!(2025-10-02 08:00:00),
                "salary",
                TransactionKind::Income,
                100.0,
            ),
            &conn,
        )
        .unwrap();

        let all = get_all_transactions(&conn).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(all, vec![first, second.clone()]);
        assert_eq!(all.iter().filter(|t| t.id == second.id).count(), 1);
    }

    #[test]
    fn get_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_all_is_ordered_by_id() {
        let conn = get_test_connection();
        // Inserted out of date order on purpose.
        for (date, amount) in [
            (datetime!(2025-03-01 00:00:00), 1.0),
            (datetime!(2025-01-01 00:00:00), 2.0),
            (datetime!(2025-02-01 00:00:00), 3.0),
        ] {
            create_transaction(
                Transaction::build(date, "food", TransactionKind::Expense, amount),
                &conn,
            )
            .unwrap();
        }

        let ids: Vec<_> = get_all_transactions(&conn)
            .unwrap()
            .iter()
            .map(|transaction| transaction.id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn list_between_is_inclusive_of_whole_end_day() {
        let conn = get_test_connection();
        let dates = [
            datetime!(2025-01-31 23:59:59),
            datetime!(2025-02-01 00:00:00),
            datetime!(2025-02-15 12:00:00),
            datetime!(2025-02-28 23:59:59),
            datetime!(2025-03-01 00:00:00),
        ];
        for date in dates {
            create_transaction(
                Transaction::build(date, "food", TransactionKind::Expense, 1.0),
                &conn,
            )
            .unwrap();
        }
        let range = DateRange::new(date!(2025 - 02 - 01), date!(2025 - 02 - 28)).unwrap();

        let got: Vec<_> = get_transactions_between(&range, &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.date)
            .collect();

        assert_eq!(got, dates[1..4].to_vec());
    }

    #[test]
    fn list_between_orders_dates_across_year_boundary() {
        let conn = get_test_connection();
        for date in [
            datetime!(2024-12-31 10:00:00),
            datetime!(2025-01-01 10:00:00),
            datetime!(2025-10-01 10:00:00),
        ] {
            create_transaction(
                Transaction::build(date, "food", TransactionKind::Expense, 1.0),
                &conn,
            )
            .unwrap();
        }
        let range = DateRange::new(date!(2024 - 12 - 31), date!(2025 - 09 - 30)).unwrap();

        let got = get_transactions_between(&range, &conn).unwrap();

        assert_eq!(got.len(), 2);
    }

    #[test]
    fn date_range_rejects_reversed_bounds() {
        assert_eq!(
            DateRange::new(date!(2025 - 02 - 02), date!(2025 - 02 - 01)),
            Err(Error::InvalidDateRange {
                start: date!(2025 - 02 - 02),
                end: date!(2025 - 02 - 01),
            })
        );
    }

    #[test]
    fn update_replaces_all_fields() {
        let conn = get_test_connection();
        let original = create_transaction(
            Transaction::build(
                datetime!(2025-10-01 08:00:00),
                "food",
                TransactionKind::Expense,
                5.0,
            ),
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            original.id,
            Transaction::build(
                datetime!(2025-10-02 09:30:00),
                "transport",
                TransactionKind::Income,
                7.5,
            ),
            &conn,
        )
        .unwrap();

        let want = Transaction {
            id: original.id,
            date: datetime!(2025-10-02 09:30:00),
            category: "transport".to_owned(),
            kind: TransactionKind::Income,
            amount: 7.5,
        };
        assert_eq!(updated, want);
        assert_eq!(get_transaction(original.id, &conn), Ok(want));
    }

    #[test]
    fn update_fails_on_missing_id() {
        let conn = get_test_connection();

        let result = update_transaction(
            7,
            Transaction::build(
                datetime!(2025-10-02 09:30:00),
                "food",
                TransactionKind::Expense,
                1.0,
            ),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(
                datetime!(2025-10-26 10:00:00),
                "food",
                TransactionKind::Expense,
                1.23,
            ),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(get_all_transactions(&conn), Ok(vec![]));
        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(
            delete_transaction(1337, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build(
                    datetime!(2025-10-05 00:00:00),
                    "food",
                    TransactionKind::Expense,
                    i as f64,
                ),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn reading_invalid_kind_fails() {
        let conn = get_test_connection();
        conn.execute(
            "INSERT INTO transactions (date, category, kind, amount)
             VALUES ('2025-01-01 00:00:00', 'food', 'gift', 1.0)",
            (),
        )
        .unwrap();

        let result = get_all_transactions(&conn);

        assert!(
            matches!(result, Err(Error::SqlError(_))),
            "want SQL conversion error, got {result:?}"
        );
    }
}
