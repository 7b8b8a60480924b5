//! The transactions page: a filterable, sortable table of every transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    config::Config,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    summary::{current_month_expenses, is_over_budget},
    timezone::local_now,
    transaction::{
        Transaction, TransactionKind,
        filter::{DateFilter, filter_bar},
        get_all_transactions, get_transactions,
        sort::{SortColumn, SortOrder, sort_transactions},
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The settings holding the monthly salary.
    pub config: Arc<Mutex<Config>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            config: state.config.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string of the transactions page.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransactionsQuery {
    /// The first day to show, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// The last day to show, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// The column to sort the table by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortColumn>,
    /// The direction to sort in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl TransactionsQuery {
    fn date_filter(&self) -> DateFilter {
        DateFilter {
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }

    /// The link for a column header.
    ///
    /// Clicking the column the table is already sorted by flips the order.
    fn sort_link(&self, column: SortColumn) -> String {
        let order = match self.sort {
            Some(current) if current == column => self.order.unwrap_or_default().reverse(),
            _ => SortOrder::Asc,
        };
        let query = TransactionsQuery {
            sort: Some(column),
            order: Some(order),
            ..self.clone()
        };

        match serde_urlencoded::to_string(&query) {
            Ok(query_string) => format!("{}?{query_string}", endpoints::TRANSACTIONS_VIEW),
            Err(error) => {
                tracing::error!("could not encode sort link for {column}: {error}");
                endpoints::TRANSACTIONS_VIEW.to_owned()
            }
        }
    }
}

/// Everything the transactions page shows.
struct TransactionsPageData {
    transactions: Vec<Transaction>,
    filter_error: Option<Error>,
    salary: f64,
    month_expenses: f64,
}

/// Render the transactions table, filtered by the `from` and `to` dates and sorted by `sort`.
///
/// An invalid date filter is reported on the page and the full table is shown instead.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)?.date();
    let salary = state
        .config
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire config lock: {error}"))
        .map_err(|_| Error::ConfigLockError)?
        .salary;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let all_transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    let month_expenses = current_month_expenses(&all_transactions, today);

    let (mut transactions, filter_error) = match query.date_filter().to_range() {
        Ok(None) => (all_transactions, None),
        Ok(Some(range)) => (get_transactions(Some(&range), &connection)?, None),
        Err(error) => {
            tracing::debug!("ignoring invalid date filter: {error}");
            (all_transactions, Some(error))
        }
    };

    sort_transactions(
        &mut transactions,
        query.sort.unwrap_or_default(),
        query.order.unwrap_or_default(),
    );

    let data = TransactionsPageData {
        transactions,
        filter_error,
        salary,
        month_expenses,
    };

    Ok(transactions_view(&query, &data).into_response())
}

fn transactions_view(query: &TransactionsQuery, data: &TransactionsPageData) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let filter = query.date_filter();
    let match_count = data.filter_error.is_none().then_some(data.transactions.len());
    let active_sort = query.sort.unwrap_or_default();
    let active_order = query.order.unwrap_or_default();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                @if is_over_budget(data.month_expenses, data.salary) {
                    (over_budget_alert(data.month_expenses, data.salary))
                }

                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                (filter_bar(endpoints::TRANSACTIONS_VIEW, &filter, match_count))

                @if let Some(error) = &data.filter_error {
                    p id="filter-error" class="text-red-600 dark:text-red-400"
                    {
                        "Invalid date filter: " (error.to_string()) ". Showing all transactions."
                    }
                }

                div class="overflow-x-auto rounded-lg shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                @for column in SortColumn::ALL {
                                    th scope="col" class=(TABLE_CELL_STYLE)
                                    {
                                        a href=(query.sort_link(column)) class="hover:underline"
                                        {
                                            (column_title(column))
                                            @if column == active_sort {
                                                @match active_order {
                                                    SortOrder::Asc => " ▲",
                                                    SortOrder::Desc => " ▼",
                                                }
                                            }
                                        }
                                    }
                                }

                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in &data.transactions {
                                (transaction_row(transaction))
                            }

                            @if data.transactions.is_empty() {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td colspan="6" class={(TABLE_CELL_STYLE) " text-center"}
                                    {
                                        "No transactions to show."
                                    }
                                }
                            }
                        }
                    }
                }

                footer
                    id="status-bar"
                    class="flex justify-between flex-wrap text-sm text-gray-600 dark:text-gray-400"
                {
                    span { "Monthly salary: " (format_currency(data.salary)) }
                    span { "Spent this month: " (format_currency(data.month_expenses)) }
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

fn column_title(column: SortColumn) -> &'static str {
    match column {
        SortColumn::Id => "ID",
        SortColumn::Date => "Date",
        SortColumn::Category => "Category",
        SortColumn::Kind => "Kind",
        SortColumn::Amount => "Amount",
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let amount_style = match transaction.kind {
        TransactionKind::Income => "text-green-600 dark:text-green-400",
        TransactionKind::Expense => "text-red-600 dark:text-red-400",
    };

    html!(
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.id) }
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date_string()) { (transaction.date_string()) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class=(TABLE_CELL_STYLE) { (transaction.kind.as_str()) }
            td class={(TABLE_CELL_STYLE) " " (amount_style)} { (format_currency(transaction.amount)) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                    button
                        hx-delete=(delete_url)
                        hx-confirm={
                            "Are you sure you want to delete transaction #" (transaction.id)
                            "? This cannot be undone."
                        }
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

fn over_budget_alert(month_expenses: f64, salary: f64) -> Markup {
    html!(
        div
            id="over-budget-alert"
            role="alert"
            class="p-4 text-sm text-red-800 rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400"
        {
            span class="font-bold" { "Budget exceeded! " }
            "You have spent " (format_currency(month_expenses)) " this month, which is more than your monthly salary of "
            (format_currency(salary)) "."
        }
    )
}
