//! Spreadsheet and CSV dumps of the transactions table.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::{Error, transaction::Transaction};

/// The column titles shared by every export format.
pub const HEADER: [&str; 5] = ["id", "date", "category", "kind", "amount"];

/// The name of the only sheet in the workbook.
const SHEET_NAME: &str = "Transactions";

/// Write `transactions` to an `.xlsx` workbook with a bold header row.
///
/// # Errors
/// Returns [Error::ExportError] if the workbook could not be built.
pub fn write_xlsx(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    build_workbook(transactions).map_err(|error| {
        tracing::error!("could not write spreadsheet: {error}");
        Error::ExportError(error.to_string())
    })
}

fn build_workbook(transactions: &[Transaction]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in (0u16..).zip(HEADER) {
        worksheet.write_string_with_format(0, col, title, &header_format)?;
    }

    for (row, transaction) in (1u32..).zip(transactions) {
        worksheet.write_number(row, 0, transaction.id as f64)?;
        worksheet.write_string(row, 1, transaction.date_string())?;
        worksheet.write_string(row, 2, &transaction.category)?;
        worksheet.write_string(row, 3, transaction.kind.as_str())?;
        worksheet.write_number(row, 4, transaction.amount)?;
    }

    workbook.save_to_buffer()
}

/// Write `transactions` as CSV, starting with the header row.
///
/// # Errors
/// Returns [Error::ExportError] if a row could not be written.
pub fn write_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let to_export_error = |error: csv::Error| {
        tracing::error!("could not write CSV: {error}");
        Error::ExportError(error.to_string())
    };

    // The header is written by hand so that an empty export still has one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER).map_err(to_export_error)?;
    for transaction in transactions {
        writer.serialize(transaction).map_err(to_export_error)?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Reader, Xlsx};
    use time::macros::datetime;

    use crate::{
        export::spreadsheet::{write_csv, write_xlsx},
        transaction::{Transaction, TransactionKind},
    };

    fn transactions() -> Vec<Transaction> {
        vec![
            Transaction {
                id: 1,
                date: datetime!(2025-10-05 14:30:00),
                category: "food".to_owned(),
                kind: TransactionKind::Expense,
                amount: 12.5,
            },
            Transaction {
                id: 2,
                date: datetime!(2025-10-06 09:00:00),
                category: "salary, main job".to_owned(),
                kind: TransactionKind::Income,
                amount: 3000.25,
            },
        ]
    }

    #[test]
    fn csv_has_header_and_rows() {
        let bytes = write_csv(&transactions()).unwrap();

        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "id,date,category,kind,amount\n\
             1,2025-10-05 14:30:00,food,expense,12.5\n\
             2,2025-10-06 09:00:00,\"salary, main job\",income,3000.25\n"
        );
    }

    #[test]
    fn empty_csv_still_has_header() {
        let text = String::from_utf8(write_csv(&[]).unwrap()).unwrap();

        assert_eq!(text, "id,date,category,kind,amount\n");
    }

    #[test]
    fn xlsx_is_a_zip_archive() {
        let bytes = write_xlsx(&transactions()).unwrap();

        assert!(bytes.starts_with(b"PK"), "want zip magic bytes");
    }

    #[test]
    fn xlsx_has_transactions_sheet() {
        let bytes = write_xlsx(&transactions()).unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Transactions".to_owned()]);

        let range = workbook.worksheet_range("Transactions").unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["id", "date", "category", "kind", "amount"]);
        assert_eq!(rows[1][1..4], ["2025-10-05 14:30:00", "food", "expense"]);
        assert_eq!(rows[2][2], "salary, main job");
        assert_eq!(rows[1][4], "12.5");
    }
}
