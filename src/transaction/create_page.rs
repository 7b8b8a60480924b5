//! Defines the route handler for the page for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::PrimitiveDateTime;

use crate::{
    AppState, Error,
    config::Config,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, link, loading_spinner},
    navigation::NavBar,
    timezone::local_now,
    transaction::{
        TransactionKind,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

fn create_transaction_view(now: PrimitiveDateTime, categories: &[String]) -> Markup {
    let create_transaction_route = endpoints::TRANSACTIONS_API;
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = transaction_form_fields(
        &TransactionFormDefaults {
            kind: TransactionKind::Expense,
            category: None,
            amount: None,
            date: now,
        },
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(create_transaction_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Add Transaction"
                }

                p class="text-sm"
                {
                    "Missing a category? Add it on the "
                    (link(endpoints::SETTINGS_VIEW, "settings page"))
                    "."
                }
            }
        }
    };

    base("Add Transaction", &[], &content)
}

/// The state needed for create new transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The settings holding the categories to choose from.
    pub config: Arc<Mutex<Config>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            config: state.config.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
) -> Result<Response, Error> {
    let categories = state
        .config
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire config lock: {error}"))
        .map_err(|_| Error::ConfigLockError)?
        .categories
        .clone();

    let now = local_now(&state.local_timezone)?;

    Ok(create_transaction_view(now, &categories).into_response())
}
