//! Client configuration and per-call credentials.
//!
//! # Design
//! The service origin and any headers every request should carry are fixed
//! when the client is constructed. Keystore credentials are not client
//! state: each operation that needs them takes a `Credentials` value.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ApiError;

/// Path prefix all service endpoints live under.
pub const API_PREFIX: &str = "api/crypto/";

/// Where the service lives and which headers go on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
    default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Use `base_url` as the endpoint root verbatim (it should already end in
    /// `/api/crypto`). A trailing slash is added when missing.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut text = base_url.trim().to_string();
        if !text.ends_with('/') {
            text.push('/');
        }
        let base_url = Url::parse(&text).map_err(|e| ApiError::InvalidUrl(format!("{text}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{text}: not a base url")));
        }
        Ok(Self {
            base_url,
            default_headers: Vec::new(),
        })
    }

    /// Root the client at `<origin>/api/crypto/`.
    pub fn for_origin(origin: &str) -> Result<Self, ApiError> {
        let origin = origin.trim().trim_end_matches('/');
        Self::new(&format!("{origin}/{API_PREFIX}"))
    }

    /// Add a header sent with every request. Per-call headers still win.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    /// Resolve an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }
}

/// Keystore password and name, echoed to the service on each call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub password: String,
    pub keystore_name: String,
}

impl Credentials {
    pub fn new(password: impl Into<String>, keystore_name: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            keystore_name: keystore_name.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &"***")
            .field("keystore_name", &self.keystore_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_added() {
        let config = ClientConfig::new("http://localhost:3000/api/crypto").unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:3000/api/crypto/");
        assert_eq!(
            config.endpoint("generate/aes").unwrap().as_str(),
            "http://localhost:3000/api/crypto/generate/aes"
        );
    }

    #[test]
    fn origin_gets_api_prefix() {
        let config = ClientConfig::for_origin("https://example.org/").unwrap();
        assert_eq!(config.base_url().as_str(), "https://example.org/api/crypto/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            ClientConfig::new("mailto:someone@example.org"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn default_header_replaces_same_name() {
        let config = ClientConfig::new("http://h/api/crypto/")
            .unwrap()
            .with_default_header("X-Trace", "1")
            .with_default_header("x-trace", "2");
        assert_eq!(
            config.default_headers(),
            &[("x-trace".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("hunter2", "main");
        let shown = format!("{creds:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("main"));
    }
}
