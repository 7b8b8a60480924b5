//! The page for editing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, TransactionId,
    config::Config,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, link, loading_spinner},
    navigation::NavBar,
    transaction::{
        Transaction,
        form::{TransactionFormDefaults, transaction_form_fields},
        get_transaction,
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The settings holding the categories to choose from.
    pub config: Arc<Mutex<Config>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            config: state.config.clone(),
        }
    }
}

/// Renders the form for editing the transaction `transaction_id`.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let transaction = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction(transaction_id, &connection)?
    };

    let categories = state
        .config
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire config lock: {error}"))
        .map_err(|_| Error::ConfigLockError)?
        .categories
        .clone();

    Ok(edit_transaction_view(&transaction, &categories).into_response())
}

fn edit_transaction_view(transaction: &Transaction, categories: &[String]) -> Markup {
    let update_route = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = transaction_form_fields(
        &TransactionFormDefaults {
            kind: transaction.kind,
            category: Some(&transaction.category),
            amount: Some(transaction.amount),
            date: transaction.date,
        },
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction #" (transaction.id) }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Save Changes"
                }

                p class="text-sm" { (link(endpoints::TRANSACTIONS_VIEW, "Back to transactions")) }
            }
        }
    };

    base("Edit Transaction", &[], &content)
}
