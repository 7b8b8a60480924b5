//! Totals over a set of transactions.
//!
//! Nothing here is cached, every value is recomputed from the transactions
//! passed in.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::transaction::{Transaction, TransactionKind};

/// The income, expenses and balance of a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses, as a positive number.
    pub expenses: f64,
    /// `income - expenses`.
    pub balance: f64,
}

/// Sum the income and expenses in `transactions`.
pub fn calculate_totals(transactions: &[Transaction]) -> Totals {
    let (income, expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expenses), transaction| {
                match transaction.kind {
                    TransactionKind::Income => (income + transaction.amount, expenses),
                    TransactionKind::Expense => (income, expenses + transaction.amount),
                }
            });

    Totals {
        income,
        expenses,
        balance: income - expenses,
    }
}

/// The total spent in each category, ignoring income.
///
/// Categories are ordered alphabetically.
pub fn expenses_by_category(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
    {
        *totals.entry(transaction.category.clone()).or_insert(0.0) += transaction.amount;
    }

    totals
}

/// The total spent in the calendar month that contains `today`.
pub fn current_month_expenses(transactions: &[Transaction], today: Date) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
        .filter(|transaction| {
            let date = transaction.date.date();
            date.year() == today.year() && date.month() == today.month()
        })
        .map(|transaction| transaction.amount)
        .sum()
}

/// Whether `month_expenses` is more than the monthly `salary`.
pub fn is_over_budget(month_expenses: f64, salary: f64) -> bool {
    month_expenses > salary
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use time::{
        PrimitiveDateTime,
        macros::{date, datetime},
    };

    use crate::{
        summary::aggregation::{
            Totals, calculate_totals, current_month_expenses, expenses_by_category,
            is_over_budget,
        },
        transaction::{Transaction, TransactionKind},
    };

    fn create_test_transaction(
        date: PrimitiveDateTime,
        category: &str,
        kind: TransactionKind,
        amount: f64,
    ) -> Transaction {
        Transaction {
            id: 0,
            date,
            category: category.to_owned(),
            kind,
            amount,
        }
    }

    fn expense(category: &str, amount: f64) -> Transaction {
        create_test_transaction(
            datetime!(2025-10-15 12:00:00),
            category,
            TransactionKind::Expense,
            amount,
        )
    }

    fn income(amount: f64) -> Transaction {
        create_test_transaction(
            datetime!(2025-10-15 12:00:00),
            "salary",
            TransactionKind::Income,
            amount,
        )
    }

    #[test]
    fn totals_sum_income_and_expenses() {
        let transactions = vec![
            income(100.0),
            income(50.0),
            expense("food", 30.0),
            expense("transport", 20.0),
        ];

        let totals = calculate_totals(&transactions);

        assert_eq!(
            totals,
            Totals {
                income: 150.0,
                expenses: 50.0,
                balance: 100.0,
            }
        );
    }

    #[test]
    fn totals_of_nothing_are_zero() {
        assert_eq!(calculate_totals(&[]), Totals::default());
    }

    #[test]
    fn groups_expenses_by_category() {
        let transactions = vec![
            expense("food", 10.0),
            expense("food", 5.0),
            expense("transport", 7.0),
            income(1000.0),
        ];

        let got = expenses_by_category(&transactions);

        let want = BTreeMap::from([("food".to_owned(), 15.0), ("transport".to_owned(), 7.0)]);
        assert_eq!(got, want);
    }

    #[test]
    fn current_month_only_counts_same_year_and_month() {
        let transactions = vec![
            create_test_transaction(
                datetime!(2025-10-01 00:00:00),
                "food",
                TransactionKind::Expense,
                10.0,
            ),
            create_test_transaction(
                datetime!(2025-10-31 23:59:59),
                "food",
                TransactionKind::Expense,
                5.0,
            ),
            // Same month, different year.
            create_test_transaction(
                datetime!(2024-10-15 12:00:00),
                "food",
                TransactionKind::Expense,
                100.0,
            ),
            create_test_transaction(
                datetime!(2025-09-30 23:59:59),
                "food",
                TransactionKind::Expense,
                100.0,
            ),
            create_test_transaction(
                datetime!(2025-10-10 12:00:00),
                "salary",
                TransactionKind::Income,
                100.0,
            ),
        ];

        assert_eq!(
            current_month_expenses(&transactions, date!(2025 - 10 - 19)),
            15.0
        );
    }

    #[test]
    fn over_budget_only_when_expenses_exceed_salary() {
        assert!(is_over_budget(100.01, 100.0));
        assert!(!is_over_budget(100.0, 100.0));
        assert!(!is_over_budget(0.0, 0.0));
    }
}
