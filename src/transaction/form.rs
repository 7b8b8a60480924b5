//! The form fields shared by the create and edit transaction pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::PrimitiveDateTime;

use crate::{
    Error,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::{
        TransactionBuilder, TransactionKind, format_timestamp, parse_amount, parse_timestamp,
    },
};

/// The form data for creating or editing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// One of the configured categories.
    pub category: String,
    /// Income or expense.
    pub kind: TransactionKind,
    /// The amount as typed by the user, validated by [parse_amount].
    pub amount: String,
    /// When the transaction happened. Blank means now.
    #[serde(default)]
    pub date: Option<String>,
}

impl TransactionForm {
    /// Parse the form into a builder, using `now` when no date was entered.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] or [Error::NegativeAmount] if the amount is not a valid number,
    /// - or [Error::InvalidTimestamp] if the date cannot be parsed.
    pub fn into_builder(self, now: PrimitiveDateTime) -> Result<TransactionBuilder, Error> {
        let amount = parse_amount(&self.amount)?;
        let date = match self.date.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => parse_timestamp(text)?,
            _ => now,
        };

        Ok(TransactionBuilder {
            date,
            category: self.category,
            kind: self.kind,
            amount,
        })
    }
}

pub struct TransactionFormDefaults<'a> {
    pub kind: TransactionKind,
    pub category: Option<&'a str>,
    pub amount: Option<f64>,
    pub date: PrimitiveDateTime,
}

/// The value of a `datetime-local` input, e.g. "2025-10-05T14:30:00".
pub fn datetime_local_value(date: PrimitiveDateTime) -> String {
    format_timestamp(date).replacen(' ', "T", 1)
}

pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    categories: &[String],
) -> Markup {
    let amount_str = defaults.amount.map(|amount| amount.to_string());
    // An edited transaction keeps its category even after it is removed from the settings.
    let removed_category = defaults
        .category
        .filter(|category| !categories.iter().any(|name| name == *category));

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Kind" }

            div class="flex gap-4"
            {
                @for kind in TransactionKind::ALL {
                    @let id = format!("transaction-kind-{kind}");

                    div class="flex items-center gap-2"
                    {
                        input
                            name="kind"
                            id=(id)
                            type="radio"
                            value=(kind.as_str())
                            checked[kind == defaults.kind]
                            required;

                        label for=(id) class="text-sm font-medium"
                        {
                            @match kind {
                                TransactionKind::Income => "Income",
                                TransactionKind::Expense => "Expense",
                            }
                        }
                    }
                }
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category" id="category" required class=(FORM_TEXT_INPUT_STYLE)
            {
                @for category in categories {
                    option
                        value=(category)
                        selected[defaults.category == Some(category.as_str())]
                    {
                        (category)
                    }
                }

                @if let Some(category) = removed_category {
                    option value=(category) selected { (category) " (removed)" }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                name="amount"
                id="amount"
                type="text"
                inputmode="decimal"
                placeholder="0.00"
                required
                autofocus
                value=[amount_str.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="datetime-local"
                step="1"
                value=(datetime_local_value(defaults.date))
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::datetime;

    use crate::{
        Error,
        transaction::{
            TransactionBuilder, TransactionKind,
            form::{TransactionForm, TransactionFormDefaults, transaction_form_fields},
        },
    };

    fn render_fields(defaults: &TransactionFormDefaults<'_>, categories: &[String]) -> Html {
        let fields = transaction_form_fields(defaults, categories);
        let markup = maud::html! { form { (fields) } };
        Html::parse_document(&markup.into_string())
    }

    fn categories() -> Vec<String> {
        vec!["food".to_owned(), "transport".to_owned()]
    }

    #[test]
    fn form_fields_check_selected_kind() {
        for (kind, expected) in [
            (TransactionKind::Expense, "expense"),
            (TransactionKind::Income, "income"),
        ] {
            let html = render_fields(
                &TransactionFormDefaults {
                    kind,
                    category: None,
                    amount: None,
                    date: datetime!(2025-10-05 14:30:00),
                },
                &categories(),
            );

            let checked = html
                .select(&Selector::parse("input[type=radio][name=kind]").unwrap())
                .find(|input| input.value().attr("checked").is_some())
                .and_then(|input| input.value().attr("value"));
            assert_eq!(checked, Some(expected));
        }
    }

    #[test]
    fn form_fields_list_categories_and_keep_removed_category() {
        let html = render_fields(
            &TransactionFormDefaults {
                kind: TransactionKind::Expense,
                category: Some("pets"),
                amount: Some(12.5),
                date: datetime!(2025-10-05 14:30:00),
            },
            &categories(),
        );

        let options: Vec<(String, bool)> = html
            .select(&Selector::parse("select[name=category] option").unwrap())
            .map(|option| {
                (
                    option.value().attr("value").unwrap_or_default().to_owned(),
                    option.value().attr("selected").is_some(),
                )
            })
            .collect();

        assert_eq!(
            options,
            vec![
                ("food".to_owned(), false),
                ("transport".to_owned(), false),
                ("pets".to_owned(), true),
            ]
        );
    }

    #[test]
    fn form_fields_prefill_amount_and_date() {
        let html = render_fields(
            &TransactionFormDefaults {
                kind: TransactionKind::Expense,
                category: Some("food"),
                amount: Some(12.5),
                date: datetime!(2025-10-05 14:30:00),
            },
            &categories(),
        );

        let value_of = |name: &str| {
            html.select(&Selector::parse(&format!("input[name={name}]")).unwrap())
                .next()
                .and_then(|input| input.value().attr("value"))
                .map(str::to_owned)
        };
        assert_eq!(value_of("amount"), Some("12.5".to_owned()));
        assert_eq!(value_of("date"), Some("2025-10-05T14:30:00".to_owned()));
    }

    #[test]
    fn blank_date_uses_now() {
        let now = datetime!(2025-10-05 14:30:00);
        let form = TransactionForm {
            category: "food".to_owned(),
            kind: TransactionKind::Expense,
            amount: "4.20".to_owned(),
            date: Some(" ".to_owned()),
        };

        assert_eq!(
            form.into_builder(now),
            Ok(TransactionBuilder {
                date: now,
                category: "food".to_owned(),
                kind: TransactionKind::Expense,
                amount: 4.2,
            })
        );
    }

    #[test]
    fn parses_datetime_local_value() {
        let form = TransactionForm {
            category: "food".to_owned(),
            kind: TransactionKind::Income,
            amount: "100".to_owned(),
            date: Some("2025-01-02T03:04".to_owned()),
        };

        let builder = form.into_builder(datetime!(2025-10-05 14:30:00)).unwrap();

        assert_eq!(builder.date, datetime!(2025-01-02 03:04:00));
    }

    #[test]
    fn rejects_non_numeric_amount() {
        let form = TransactionForm {
            category: "food".to_owned(),
            kind: TransactionKind::Expense,
            amount: "ten dollars".to_owned(),
            date: None,
        };

        assert_eq!(
            form.into_builder(datetime!(2025-10-05 14:30:00)),
            Err(Error::InvalidAmount("ten dollars".to_owned()))
        );
    }
}
