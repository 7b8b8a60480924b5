//! Defines the endpoint for updating an existing transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, TransactionId,
    config::Config,
    endpoints,
    timezone::local_now,
    transaction::{form::TransactionForm, get_transaction, update_transaction},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The settings holding the valid categories.
    pub config: Arc<Mutex<Config>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            config: state.config.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for replacing the fields of a transaction, redirects to transactions view on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    match edit_transaction(&state, transaction_id, form) {
        Ok(()) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::debug!("could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_transaction(
    state: &EditTransactionState,
    transaction_id: TransactionId,
    form: TransactionForm,
) -> Result<(), Error> {
    let now = local_now(&state.local_timezone)?;
    let builder = form.into_builder(now)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let existing = get_transaction(transaction_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })?;

    let builder = {
        let config = state
            .config
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire config lock: {error}"))
            .map_err(|_| Error::ConfigLockError)?;

        builder.validate_edit(&existing.category, &config)?
    };

    update_transaction(transaction_id, builder, &connection)?;

    Ok(())
}
