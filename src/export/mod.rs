//! Full dumps of the transactions table as a spreadsheet, CSV or PDF file.
//!
//! Exports always contain every transaction ordered by ID. The web UI offers
//! them as downloads and the command line tool writes them to a file.

mod pdf;
mod spreadsheet;

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    transaction::{Transaction, get_all_transactions},
};

pub use pdf::write_pdf;
pub use spreadsheet::{HEADER, write_csv, write_xlsx};

/// The file formats transactions can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// An Excel workbook.
    Xlsx,
    /// Comma separated values.
    Csv,
    /// A printable table.
    Pdf,
}

impl ExportFormat {
    /// The file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// The MIME type sent with downloads.
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// The default name of the exported file, e.g. "transactions.csv".
    pub fn file_name(self) -> String {
        format!("transactions.{}", self.extension())
    }

    /// Render `transactions` in this format.
    ///
    /// # Errors
    /// Returns [Error::ExportError] if the file could not be built.
    pub fn write(self, transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
        match self {
            ExportFormat::Xlsx => write_xlsx(transactions),
            ExportFormat::Csv => write_csv(transactions),
            ExportFormat::Pdf => Ok(write_pdf(transactions)),
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Download every transaction as an `.xlsx` workbook.
pub async fn export_spreadsheet(State(state): State<ExportState>) -> Result<Response, Error> {
    export_response(&state, ExportFormat::Xlsx)
}

/// Download every transaction as a CSV file.
pub async fn export_csv(State(state): State<ExportState>) -> Result<Response, Error> {
    export_response(&state, ExportFormat::Csv)
}

/// Download every transaction as a PDF table.
pub async fn export_pdf(State(state): State<ExportState>) -> Result<Response, Error> {
    export_response(&state, ExportFormat::Pdf)
}

fn export_response(state: &ExportState, format: ExportFormat) -> Result<Response, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_transactions(&connection)?
    };

    let bytes = format.write(&transactions)?;
    tracing::info!(
        "Exported {} transactions as {format} ({} bytes)",
        transactions.len(),
        bytes.len()
    );

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, format.content_type().to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        bytes,
    )
        .into_response())
}
