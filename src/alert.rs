//! Error messages shown to users after a failed htmx request.
//!
//! Alerts are HTML fragments that htmx swaps into the `#alert-container`
//! element rendered by [base](crate::html::base).

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// A dismissable error message shown at the bottom of the page.
///
/// Successful requests redirect with `HX-Redirect` instead of showing an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// The headline.
    message: String,
    /// What went wrong and how to fix it.
    details: String,
}

impl Alert {
    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        html!(
            div
                role="alert"
                class="flex items-start gap-3 p-4 text-sm rounded shadow-lg border \
                    text-red-800 bg-red-50 border-red-300 \
                    dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="mt-1" { (self.details) }
                    }
                }

                button
                    type="button"
                    aria-label="Close"
                    class="font-bold leading-none"
                    onclick="this.closest('#alert-container').classList.add('hidden')"
                {
                    "×"
                }
            }
        )
    }

    /// Render the alert with the given status code.
    ///
    /// htmx only swaps error responses into `hx-target-error`, so `status`
    /// should be a 4xx or 5xx code.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Html(self.into_html().into_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::{
        alert::Alert,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    #[tokio::test]
    async fn error_alert_has_message_and_details() {
        let response = Alert::error("Invalid input", "\"abc\" is not a valid amount")
            .into_response_with_status(StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let alert = html
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("no alert found");
        let text = alert.text().collect::<String>();
        assert!(text.contains("Invalid input"), "got alert text {text:?}");
        assert!(
            text.contains("\"abc\" is not a valid amount"),
            "got alert text {text:?}"
        );
    }

    #[tokio::test]
    async fn empty_details_are_left_out() {
        let response = Alert::error("Something went wrong", "")
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_fragment(response).await;
        let paragraphs = html
            .select(&Selector::parse("div[role=alert] p").unwrap())
            .count();
        assert_eq!(paragraphs, 1);
    }
}
