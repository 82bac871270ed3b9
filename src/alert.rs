//! Alert system for displaying success and error messages to users.
//!
//! Alerts are HTML fragments that HTMX swaps into the `#alert-container`
//! element of the base layout.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A message to show to the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// An action succeeded, with extra details.
    Success { message: String, details: String },
    /// An action succeeded.
    SuccessSimple { message: String },
    /// An action failed, with details on what to do about it.
    Error { message: String, details: String },
    /// An action failed.
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }

    fn into_markup(self) -> Markup {
        let (is_success, message, details) = match self {
            Alert::Success { message, details } => (true, message, details),
            Alert::SuccessSimple { message } => (true, message, String::new()),
            Alert::Error { message, details } => (false, message, details),
            Alert::ErrorSimple { message } => (false, message, String::new()),
        };

        let style = if is_success {
            "flex items-start gap-3 p-4 rounded border text-green-800 bg-green-50 \
            border-green-300 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        } else {
            "flex items-start gap-3 p-4 rounded border text-red-800 bg-red-50 \
            border-red-300 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        };

        html! {
            div
                role="alert"
                class=(style)
                data-alert-kind=(if is_success { "success" } else { "error" })
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="text-sm mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    class="text-sm underline"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "Dismiss"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_shows_message_and_details() {
        let html = Alert::Error {
            message: "Could not delete tag".to_owned(),
            details: "Try again".to_owned(),
        }
        .into_html()
        .0;

        let document = Html::parse_fragment(&html);
        let paragraphs = document
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();

        assert_eq!(paragraphs, vec!["Could not delete tag", "Try again"]);
    }

    #[test]
    fn simple_alert_omits_details() {
        let html = Alert::SuccessSimple {
            message: "Saved".to_owned(),
        }
        .into_html()
        .0;

        let document = Html::parse_fragment(&html);
        let count = document.select(&Selector::parse("p").unwrap()).count();

        assert_eq!(count, 1);
        assert!(html.contains("data-alert-kind=\"success\""));
    }
}
