//! The from/to date filter shared by the transactions and summary pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, macros::date};

use crate::{
    Error,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE},
    transaction::{DateRange, parse_date},
};

/// Stands in for a missing lower bound.
const EARLIEST_DATE: Date = date!(0000 - 01 - 01);
/// Stands in for a missing upper bound.
const LATEST_DATE: Date = date!(9999 - 12 - 31);

/// The `from` and `to` query parameters, as `YYYY-MM-DD` strings.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct DateFilter {
    /// The first day to include.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub from: Option<String>,
    /// The last day to include.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub to: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|text| text.trim().is_empty())
}

impl DateFilter {
    /// Whether neither bound is set.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.from) && is_blank(&self.to)
    }

    /// The range selected by the filter, or `None` when no bound is set.
    ///
    /// A missing bound leaves that end of the range open.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimestamp] if a bound is not a date, or
    /// [Error::InvalidDateRange] if `from` is after `to`.
    pub fn to_range(&self) -> Result<Option<DateRange>, Error> {
        date_range(self.from.as_deref(), self.to.as_deref())
    }
}

/// Build a [DateRange] from optional `YYYY-MM-DD` bounds. Blank bounds count as missing.
///
/// # Errors
/// Returns [Error::InvalidTimestamp] if a bound is not a date, or
/// [Error::InvalidDateRange] if `from` is after `to`.
pub fn date_range(from: Option<&str>, to: Option<&str>) -> Result<Option<DateRange>, Error> {
    let parse = |bound: Option<&str>| {
        bound
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(parse_date)
            .transpose()
    };

    match (parse(from)?, parse(to)?) {
        (None, None) => Ok(None),
        (start, end) => DateRange::new(
            start.unwrap_or(EARLIEST_DATE),
            end.unwrap_or(LATEST_DATE),
        )
        .map(Some),
    }
}

/// A GET form for narrowing the page to a date range.
///
/// `match_count` is shown next to the buttons when given.
pub fn filter_bar(action: &str, filter: &DateFilter, match_count: Option<usize>) -> Markup {
    html! {
        form
            method="get"
            action=(action)
            id="date-filter"
            class="flex flex-wrap items-end gap-4 w-full mb-4"
        {
            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    type="date"
                    name="from"
                    id="from"
                    value=[filter.from.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    type="date"
                    name="to"
                    id="to"
                    value=[filter.to.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button
                type="submit"
                class="px-4 py-2 bg-blue-500 hover:bg-blue-600 text-white rounded"
            {
                "Filter"
            }

            @if !filter.is_empty() {
                a href=(action) class=(LINK_STYLE) { "Clear" }
            }

            @if let Some(count) = match_count {
                p id="match-count" class="text-sm text-gray-600 dark:text-gray-400"
                {
                    (count) " matching " @if count == 1 { "transaction" } @else { "transactions" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error,
        transaction::{
            DateRange,
            filter::{DateFilter, date_range, filter_bar},
        },
    };

    #[test]
    fn no_bounds_means_no_range() {
        assert_eq!(date_range(None, Some("  ")), Ok(None));
    }

    #[test]
    fn parses_both_bounds() {
        assert_eq!(
            date_range(Some("2025-01-01"), Some("2025-01-31")),
            Ok(Some(
                DateRange::new(date!(2025 - 01 - 01), date!(2025 - 01 - 31)).unwrap()
            ))
        );
    }

    #[test]
    fn missing_bound_is_open() {
        let range = date_range(Some("2025-06-01"), None).unwrap().unwrap();

        assert_eq!(range.start(), date!(2025 - 06 - 01));
        assert!(range.end() > date!(3000 - 01 - 01));
    }

    #[test]
    fn rejects_reversed_range() {
        assert_eq!(
            date_range(Some("2025-02-01"), Some("2025-01-01")),
            Err(Error::InvalidDateRange {
                start: date!(2025 - 02 - 01),
                end: date!(2025 - 01 - 01),
            })
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            date_range(Some("last tuesday"), None),
            Err(Error::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn filter_bar_shows_match_count() {
        let filter = DateFilter {
            from: Some("2025-01-01".to_owned()),
            to: None,
        };

        let html = Html::parse_fragment(&filter_bar("/transactions", &filter, Some(3)).into_string());

        let count: String = html
            .select(&Selector::parse("#match-count").unwrap())
            .next()
            .expect("no match count")
            .text()
            .collect();
        assert_eq!(count.trim(), "3 matching transactions");
        let from = html
            .select(&Selector::parse("input[name=from]").unwrap())
            .next()
            .and_then(|input| input.value().attr("value"));
        assert_eq!(from, Some("2025-01-01"));
    }
}
