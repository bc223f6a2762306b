//! Error types for the keystore API client.
//!
//! # Design
//! Application failures (any non-2xx status) carry a `Rejection`, the
//! `{status, ok: false, message}` object the service contract describes.
//! Everything else is a local failure: the body could not be decoded, the
//! request could not be encoded, or the host could not complete the
//! exchange at all.

use serde::{Deserialize, Serialize};

/// A structured application failure produced from a non-2xx response.
///
/// `ok` is always `false`; it exists so the serialized form matches the
/// object callers of the service expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub status: u16,
    pub ok: bool,
    pub message: String,
}

impl Rejection {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            ok: false,
            message: message.into(),
        }
    }
}

/// Errors returned by the transport and `KeystoreClient` parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the operation with a non-2xx status.
    #[error("HTTP {}: {}", .0.status, .0.message)]
    Rejected(Rejection),

    /// A body declared as JSON, or expected in a typed shape, could not be
    /// parsed.
    #[error("parse failed: {0}")]
    Parse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The configured base URL or an endpoint path is not a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The host could not complete the HTTP exchange.
    #[error("network error: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ApiError::Rejected(Rejection::new(status, message))
    }

    /// The rejection, when the failure came from the server.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ApiError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Whether the exchange itself failed, as opposed to the server saying no.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Parse(_))
    }
}
