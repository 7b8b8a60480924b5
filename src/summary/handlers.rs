//! The summary page: totals, a per-category expense table and a pie chart.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        ECHARTS_SCRIPT, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    summary::{
        aggregation::{Totals, calculate_totals, expenses_by_category},
        charts::{SummaryChart, chart_view, charts_script, expenses_pie_chart},
    },
    transaction::{DateFilter, filter_bar, get_transactions},
};

/// The state needed for the summary page.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the totals of the transactions between the `from` and `to` dates.
pub async fn get_summary_page(
    State(state): State<SummaryState>,
    Query(filter): Query<DateFilter>,
) -> Result<Response, Error> {
    let range = match filter.to_range() {
        Ok(range) => range,
        Err(error) => {
            tracing::debug!("invalid summary date filter: {error}");
            return Ok(summary_error_view(&filter, &error).into_response());
        }
    };

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(range.as_ref(), &connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?
    };

    let totals = calculate_totals(&transactions);
    let expenses = expenses_by_category(&transactions);

    Ok(summary_view(&filter, transactions.len(), &totals, &expenses).into_response())
}

fn totals_table(totals: &Totals) -> Markup {
    let balance_style = if totals.balance >= 0.0 {
        "text-green-600 dark:text-green-400"
    } else {
        "text-red-600 dark:text-red-400"
    };

    html! {
        table id="totals" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
        {
            tbody
            {
                tr class=(TABLE_ROW_STYLE)
                {
                    th scope="row" class=(TABLE_CELL_STYLE) { "Income" }
                    td class={(TABLE_CELL_STYLE) " text-right"} { (format_currency(totals.income)) }
                }
                tr class=(TABLE_ROW_STYLE)
                {
                    th scope="row" class=(TABLE_CELL_STYLE) { "Expenses" }
                    td class={(TABLE_CELL_STYLE) " text-right"} { (format_currency(totals.expenses)) }
                }
                tr class=(TABLE_ROW_STYLE)
                {
                    th scope="row" class=(TABLE_CELL_STYLE) { "Balance" }
                    td class={(TABLE_CELL_STYLE) " text-right font-bold " (balance_style)}
                    {
                        (format_currency(totals.balance))
                    }
                }
            }
        }
    }
}

fn category_table(expenses: &BTreeMap<String, f64>) -> Markup {
    html! {
        table id="category-expenses" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Spent" }
                }
            }
            tbody
            {
                @for (category, total) in expenses {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        th scope="row" class=(TABLE_CELL_STYLE) { (category) }
                        td class={(TABLE_CELL_STYLE) " text-right"} { (format_currency(*total)) }
                    }
                }
            }
        }
    }
}

fn summary_view(
    filter: &DateFilter,
    transaction_count: usize,
    totals: &Totals,
    expenses: &BTreeMap<String, f64>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::SUMMARY_VIEW).into_html();
    let charts = if expenses.is_empty() {
        vec![]
    } else {
        vec![SummaryChart {
            id: "expenses-chart",
            options: expenses_pie_chart(expenses).to_string(),
        }]
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Summary" }

                (filter_bar(endpoints::SUMMARY_VIEW, filter, Some(transaction_count)))

                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    div class="space-y-4"
                    {
                        (totals_table(totals))

                        @if expenses.is_empty() {
                            p { "No expenses in this period." }
                        } @else {
                            (category_table(expenses))
                        }
                    }

                    @for chart in &charts {
                        (chart_view(chart))
                    }
                }
            }
        }
    );

    let scripts = if charts.is_empty() {
        vec![]
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
            charts_script(&charts),
        ]
    };

    base("Summary", &scripts, &content)
}

fn summary_error_view(filter: &DateFilter, error: &Error) -> Markup {
    let nav_bar = NavBar::new(endpoints::SUMMARY_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Summary" }

                (filter_bar(endpoints::SUMMARY_VIEW, filter, None))

                p id="filter-error" class="text-red-600 dark:text-red-400"
                {
                    "Invalid date filter: " (error.to_string()) ". "
                    (link(endpoints::SUMMARY_VIEW, "Show everything"))
                }
            }
        }
    );

    base("Summary", &[], &content)
}
