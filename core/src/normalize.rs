//! Unwrapping of payloads the service delivers inside an HTML shell.
//!
//! Some deployments sit behind a tunnel that turns plain responses into an
//! HTML page carrying the real value in the `data-payload` attribute of the
//! `#root` element. Normalization accepts wrapped and unwrapped bodies alike
//! and never fails: anything it cannot unwrap is passed through untouched.

use scraper::{Html, Selector};
use serde_json::Value;

use crate::transport::ResponseBody;

const ROOT_SELECTOR: &str = "#root";
const PAYLOAD_ATTR: &str = "data-payload";

/// A response body after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Text that carried no HTML shell.
    PlainText(String),
    /// A body the server declared and delivered as JSON.
    ParsedJson(Value),
    /// The `data-payload` value pulled out of an HTML shell.
    HtmlWrapped(String),
}

impl Payload {
    /// Collapse to display text. JSON strings lose their quotes; other JSON
    /// values are rendered compactly.
    pub fn into_text(self) -> String {
        match self {
            Payload::PlainText(text) | Payload::HtmlWrapped(text) => text,
            Payload::ParsedJson(Value::String(text)) => text,
            Payload::ParsedJson(value) => value.to_string(),
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, Payload::HtmlWrapped(_))
    }
}

/// Return the `data-payload` attribute of the `#root` element, if any.
pub fn extract_payload(markup: &str) -> Option<String> {
    if !markup.contains('<') {
        return None;
    }
    let Ok(selector) = Selector::parse(ROOT_SELECTOR) else {
        return None;
    };
    let document = Html::parse_document(markup);
    let root = document.select(&selector).next()?;
    root.value().attr(PAYLOAD_ATTR).map(str::to_string)
}

/// Resolve a decoded body into a tagged `Payload`.
pub fn normalize(body: ResponseBody) -> Payload {
    match body {
        ResponseBody::Json(value) => Payload::ParsedJson(value),
        ResponseBody::Text(text) => match extract_payload(&text) {
            Some(inner) => Payload::HtmlWrapped(inner),
            None => Payload::PlainText(text),
        },
    }
}
