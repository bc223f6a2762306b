//! A configured client, its transport, and the keystore credentials.

use keystore_core::{
    validate, ApiError, Credentials, HttpRequest, HttpResponse, KeystoreClient, ValidationError,
};

use crate::args::Connection;
use crate::config::Config;
use crate::transport::Transport;

use super::CommandError;

pub struct Session {
    client: KeystoreClient,
    transport: Transport,
    credentials: Option<Credentials>,
}

impl Session {
    pub fn new(
        client: KeystoreClient,
        transport: Transport,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            client,
            transport,
            credentials,
        }
    }

    /// Resolve connection settings: flags and environment first, then the
    /// config file.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Api`] when the base URL is invalid.
    pub fn connect(config: &Config, connection: &Connection) -> Result<Self, CommandError> {
        let client_config = config
            .server
            .client_config(connection.base_url.as_deref())?;
        let keystore = connection
            .keystore
            .clone()
            .or_else(|| config.keystore.name.clone());
        let credentials = match (connection.password.clone(), keystore) {
            (Some(password), Some(name)) => Some(Credentials::new(password, name)),
            _ => None,
        };
        tracing::debug!(
            base_url = %client_config.base_url(),
            has_credentials = credentials.is_some(),
            "session configured"
        );
        Ok(Self::new(
            KeystoreClient::new(client_config),
            Transport::new(config.server.timeout()),
            credentials,
        ))
    }

    pub fn client(&self) -> &KeystoreClient {
        &self.client
    }

    /// The keystore credentials, or a validation error when either part is
    /// missing.
    pub fn credentials(&self) -> Result<&Credentials, CommandError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(ValidationError::MissingCredentials)?;
        validate::credentials(&creds.password, &creds.keystore_name)?;
        Ok(creds)
    }

    pub fn send(&self, request: Result<HttpRequest, ApiError>) -> Result<HttpResponse, ApiError> {
        self.transport.execute(request?)
    }

    pub fn text(&self, request: Result<HttpRequest, ApiError>) -> Result<String, ApiError> {
        self.client.parse_text(&self.send(request)?)
    }

    pub fn empty(&self, request: Result<HttpRequest, ApiError>) -> Result<(), ApiError> {
        self.client.parse_empty(&self.send(request)?)
    }

    pub fn aliases(&self, request: Result<HttpRequest, ApiError>) -> Result<Vec<String>, ApiError> {
        self.client.parse_aliases(&self.send(request)?)
    }

    pub fn verdict(&self, request: Result<HttpRequest, ApiError>) -> Result<bool, ApiError> {
        self.client.parse_verdict(&self.send(request)?)
    }
}
