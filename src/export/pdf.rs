//! A minimal PDF writer for printing the transactions as a table.
//!
//! Pages are A4 portrait and use the standard Helvetica font, which every PDF
//! viewer provides, so nothing needs to be embedded. Content streams are left
//! uncompressed.

use crate::{export::spreadsheet::HEADER, transaction::Transaction};

const PAGE_WIDTH: f64 = 595.28;
const PAGE_HEIGHT: f64 = 841.89;
const MARGIN: f64 = 50.0;
const ROW_HEIGHT: f64 = 20.0;
const FONT_SIZE: f64 = 10.0;
const CELL_PADDING: f64 = 4.0;
/// Widths of the id, date, category, kind and amount columns in points.
const COLUMN_WIDTHS: [f64; 5] = [45.0, 125.0, 155.0, 75.0, 95.28];
/// The header row takes one of the rows on every page.
const ROWS_PER_PAGE: usize = ((PAGE_HEIGHT - 2.0 * MARGIN) / ROW_HEIGHT) as usize - 1;

/// Render `transactions` as a table spread over as many pages as needed.
///
/// The header row is repeated at the top of each page. An empty list produces
/// a single page with only the header.
pub fn write_pdf(transactions: &[Transaction]) -> Vec<u8> {
    let rows: Vec<[String; 5]> = transactions.iter().map(table_row).collect();
    let pages: Vec<String> = if rows.is_empty() {
        vec![page_content(&[])]
    } else {
        rows.chunks(ROWS_PER_PAGE).map(page_content).collect()
    };

    PdfDocument::new(&pages).into_bytes()
}

fn table_row(transaction: &Transaction) -> [String; 5] {
    [
        transaction.id.to_string(),
        transaction.date_string(),
        transaction.category.clone(),
        transaction.kind.as_str().to_owned(),
        format!("{:.2}", transaction.amount),
    ]
}

/// The drawing commands for one page of the table.
fn page_content(rows: &[[String; 5]]) -> String {
    let table_width: f64 = COLUMN_WIDTHS.iter().sum();
    let top = PAGE_HEIGHT - MARGIN;
    let row_count = rows.len() + 1;
    let bottom = top - ROW_HEIGHT * row_count as f64;

    let mut content = String::new();

    // Grey header background.
    content.push_str(&format!(
        "0.85 g\n{MARGIN:.2} {:.2} {table_width:.2} {ROW_HEIGHT:.2} re f\n",
        top - ROW_HEIGHT
    ));

    // Black 1pt grid.
    content.push_str("0 G\n1 w\n");
    for line in 0..=row_count {
        let y = top - ROW_HEIGHT * line as f64;
        content.push_str(&format!(
            "{MARGIN:.2} {y:.2} m {:.2} {y:.2} l S\n",
            MARGIN + table_width
        ));
    }
    let mut x = MARGIN;
    for width in COLUMN_WIDTHS.iter().chain([&0.0]) {
        content.push_str(&format!("{x:.2} {top:.2} m {x:.2} {bottom:.2} l S\n"));
        x += width;
    }

    // Cell text, clipped to the cell so long values do not spill into the next column.
    content.push_str("0 g\n");
    let header = HEADER.map(str::to_owned);
    for (line, cells) in std::iter::once(&header).chain(rows).enumerate() {
        let cell_bottom = top - ROW_HEIGHT * (line + 1) as f64;
        let baseline = cell_bottom + (ROW_HEIGHT - FONT_SIZE) / 2.0 + 2.0;
        let mut x = MARGIN;

        for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
            content.push_str(&format!(
                "q {x:.2} {cell_bottom:.2} {width:.2} {ROW_HEIGHT:.2} re W n \
                 BT /F1 {FONT_SIZE:.0} Tf 1 0 0 1 {:.2} {baseline:.2} Tm ({}) Tj ET Q\n",
                x + CELL_PADDING,
                escape_text(cell)
            ));
            x += width;
        }
    }

    content
}

/// Escape `text` for a PDF literal string in the WinAnsi encoding.
///
/// Characters outside printable ASCII are written as octal escapes of their
/// Windows-1252 code. Characters Windows-1252 cannot represent become '?'.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for character in text.chars() {
        match character {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(character);
            }
            ' '..='~' => escaped.push(character),
            _ => match win_ansi_code(character) {
                Some(code) => escaped.push_str(&format!("\\{code:03o}")),
                None => escaped.push('?'),
            },
        }
    }

    escaped
}

/// Windows-1252 codes 0x80 to 0x9F, the only ones that differ from Latin-1.
const WIN_ANSI_EXTRAS: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

fn win_ansi_code(character: char) -> Option<u8> {
    match character {
        '\u{A0}'..='\u{FF}' => u8::try_from(u32::from(character)).ok(),
        _ => WIN_ANSI_EXTRAS
            .iter()
            .find(|(extra, _)| *extra == character)
            .map(|(_, code)| *code),
    }
}

/// The objects of a PDF file, numbered from 1 in the order they are added.
struct PdfDocument {
    objects: Vec<String>,
}

impl PdfDocument {
    const CATALOG_ID: usize = 1;
    const PAGES_ID: usize = 2;
    const FONT_ID: usize = 3;

    fn new(page_contents: &[String]) -> Self {
        // Each page takes two objects, the page and its content stream, after the first three.
        let page_ids: Vec<usize> = (0..page_contents.len())
            .map(|index| Self::FONT_ID + 1 + 2 * index)
            .collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects = vec![
            format!("<< /Type /Catalog /Pages {} 0 R >>", Self::PAGES_ID),
            format!(
                "<< /Type /Pages /Kids [{kids}] /Count {} >>",
                page_contents.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_owned(),
        ];

        for (content, page_id) in page_contents.iter().zip(page_ids) {
            objects.push(format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
                Self::PAGES_ID,
                Self::FONT_ID,
                page_id + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}endstream",
                content.len()
            ));
        }

        debug_assert_eq!(objects.len(), Self::FONT_ID + 2 * page_contents.len());

        Self { objects }
    }

    fn into_bytes(self) -> Vec<u8> {
        let mut output = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(self.objects.len());

        for (index, object) in self.objects.iter().enumerate() {
            offsets.push(output.len());
            output.push_str(&format!("{} 0 obj\n{object}\nendobj\n", index + 1));
        }

        let xref_offset = output.len();
        output.push_str(&format!("xref\n0 {}\n", self.objects.len() + 1));
        output.push_str("0000000000 65535 f \n");
        for offset in offsets {
            output.push_str(&format!("{offset:010} 00000 n \n"));
        }
        output.push_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            self.objects.len() + 1,
            Self::CATALOG_ID
        ));

        output.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        export::pdf::{ROWS_PER_PAGE, escape_text, write_pdf},
        transaction::{Transaction, TransactionKind},
    };

    fn transaction(id: i64, category: &str) -> Transaction {
        Transaction {
            id,
            date: datetime!(2025-10-05 14:30:00),
            category: category.to_owned(),
            kind: TransactionKind::Expense,
            amount: 12.5,
        }
    }

    fn page_count(pdf: &str) -> usize {
        pdf.matches("/Type /Page ").count()
    }

    #[test]
    fn pdf_contains_header_and_every_row() {
        let transactions = vec![transaction(1, "food"), transaction(2, "transport")];

        let pdf = String::from_utf8(write_pdf(&transactions)).unwrap();

        assert!(pdf.starts_with("%PDF-"));
        assert!(pdf.trim_end().ends_with("%%EOF"));
        for text in [
            "(id)",
            "(amount)",
            "(2025-10-05 14:30:00)",
            "(food)",
            "(transport)",
            "(expense)",
            "(12.50)",
        ] {
            assert!(pdf.contains(text), "want {text} in PDF");
        }
        assert!(pdf.contains("/BaseFont /Helvetica"));
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn long_tables_repeat_header_on_each_page() {
        let transactions: Vec<Transaction> = (1..=(ROWS_PER_PAGE as i64 + 1))
            .map(|id| transaction(id, "food"))
            .collect();

        let pdf = String::from_utf8(write_pdf(&transactions)).unwrap();

        assert_eq!(page_count(&pdf), 2);
        assert_eq!(pdf.matches("(category)").count(), 2);
    }

    #[test]
    fn empty_table_has_one_page() {
        let pdf = String::from_utf8(write_pdf(&[])).unwrap();

        assert_eq!(page_count(&pdf), 1);
        assert!(pdf.contains("(kind)"));
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_text(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape_text("café"), r"caf\351");
        assert_eq!(escape_text("€5"), r"\2005");
        assert_eq!(escape_text("食"), "?");
    }

    #[test]
    fn keeps_accented_categories() {
        let pdf = String::from_utf8(write_pdf(&[transaction(1, "alimentación")])).unwrap();

        assert!(pdf.contains(r"(alimentaci\363n)"), "got {pdf}");
    }

    #[test]
    fn every_cell_is_clipped_to_its_column() {
        let pdf = String::from_utf8(write_pdf(&[transaction(1, "food")])).unwrap();

        // Two rows of five cells, header included.
        assert_eq!(pdf.matches(" re W n ").count(), 10);
        assert!(pdf.contains("q 50.00 751.89 45.00 20.00 re W n BT /F1 10 Tf"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = write_pdf(&[transaction(1, "food")]);
        let pdf = String::from_utf8(bytes).unwrap();

        let xref_start = pdf.find("xref\n").unwrap();
        let offsets: Vec<usize> = pdf[xref_start..]
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().unwrap())
            .collect();

        for (index, offset) in offsets.iter().enumerate() {
            assert!(
                pdf[*offset..].starts_with(&format!("{} 0 obj", index + 1)),
                "object {} is not at offset {offset}",
                index + 1
            );
        }
    }
}
