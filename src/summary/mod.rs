//! Summaries of income and expenses.
//!
//! Provides the aggregation functions shared by the web UI and the command
//! line tool, and the summary page with its expense pie chart.

mod aggregation;
mod charts;
mod handlers;

pub use aggregation::{
    Totals, calculate_totals, current_month_expenses, expenses_by_category, is_over_budget,
};

pub(crate) use handlers::get_summary_page;
