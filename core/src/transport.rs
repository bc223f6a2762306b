//! Response classification: success body or structured rejection.
//!
//! The decision between JSON and text is made from the headers alone, before
//! the body is inspected. A body declared as JSON that does not parse is a
//! `Parse` error, never a silent fallback to text.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Text(String),
    Json(Value),
}

/// Whether the response headers declare a non-empty JSON body.
pub fn is_json(response: &HttpResponse) -> bool {
    let empty = response.header("content-length") == Some("0");
    let json = response
        .header("content-type")
        .is_some_and(|ct| ct.contains("application/json"));
    !empty && json
}

/// Decode the body as JSON or text according to the response headers.
pub fn decode_body(response: &HttpResponse) -> Result<ResponseBody, ApiError> {
    if is_json(response) {
        serde_json::from_str(&response.body)
            .map(ResponseBody::Json)
            .map_err(|e| ApiError::Parse(e.to_string()))
    } else {
        Ok(ResponseBody::Text(response.body.clone()))
    }
}

/// Resolve a 2xx response to its decoded body; reject anything else.
///
/// Error bodies are decoded with the same rule as success bodies. The
/// rejection message is the raw text, or the `message` field of a JSON body.
pub fn classify(response: &HttpResponse) -> Result<ResponseBody, ApiError> {
    let body = decode_body(response)?;
    if response.is_success() {
        return Ok(body);
    }
    let message = match body {
        ResponseBody::Text(text) => text,
        ResponseBody::Json(value) => match value.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
    };
    Err(ApiError::rejected(response.status, message))
}
