//! Stateless request builder and response parser for the keystore API.
//!
//! # Design
//! `KeystoreClient` holds only a `ClientConfig` and carries no mutable state
//! between calls. Each endpoint has a `build_*` method producing an
//! `HttpRequest`; responses are turned into values by the shape-specific
//! `parse_*` methods. The caller executes the HTTP round-trip in between,
//! keeping the core deterministic and free of I/O dependencies.
//!
//! Reads go out as GET with a query string, writes as POST with a JSON body.

use serde::Serialize;
use serde_json::Value;

use crate::config::{ClientConfig, Credentials};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::{normalize, Payload};
use crate::transport::classify;
use crate::types::{
    CipherTextRequest, FilterAliases, GenerateKey, KeyAlgorithm, KeyHalf, KeySize,
    KeystoreAccess, PlainTextRequest, PublicEncrypt, RandomAlgorithm, VerifySignature,
};

/// Header that keeps the tunnel in front of the service from answering with
/// its browser interstitial.
pub const SKIP_BROWSER_WARNING: (&str, &str) = ("ngrok-skip-browser-warning", "true");

/// Synchronous, stateless client for the keystore API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct KeystoreClient {
    config: ClientConfig,
}

impl KeystoreClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Keystore session
    // -----------------------------------------------------------------------

    pub fn build_create_keystore(&self, creds: &Credentials) -> Result<HttpRequest, ApiError> {
        self.post("create-keystore", &access(creds))
    }

    pub fn build_login_keystore(&self, creds: &Credentials) -> Result<HttpRequest, ApiError> {
        self.post("login-keystore", &access(creds))
    }

    // -----------------------------------------------------------------------
    // Key generation and retrieval
    // -----------------------------------------------------------------------

    /// `name` is the bare key name; the service adds the family prefix.
    pub fn build_generate_key(
        &self,
        algorithm: KeyAlgorithm,
        creds: &Credentials,
        name: &str,
        key_size: KeySize,
        random_algorithm: Option<RandomAlgorithm>,
    ) -> Result<HttpRequest, ApiError> {
        let body = GenerateKey {
            key_size,
            alias: name.to_string(),
            password: creds.password.clone(),
            random_algorithm,
            keystore_name: creds.keystore_name.clone(),
        };
        self.post(&format!("generate/{}", algorithm.as_str()), &body)
    }

    pub fn build_load_aes_key(
        &self,
        creds: &Credentials,
        alias: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.get(
            "load/aes",
            &[
                ("alias", alias),
                ("password", &creds.password),
                ("keystoreName", &creds.keystore_name),
            ],
        )
    }

    pub fn build_rsa_public_key(&self, alias: &str) -> Result<HttpRequest, ApiError> {
        self.build_key_half(KeyAlgorithm::Rsa, KeyHalf::Public, alias, None)
    }

    pub fn build_rsa_private_key(
        &self,
        creds: &Credentials,
        alias: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.build_key_half(KeyAlgorithm::Rsa, KeyHalf::Private, alias, Some(creds))
    }

    pub fn build_dsa_public_key(&self, alias: &str) -> Result<HttpRequest, ApiError> {
        self.build_key_half(KeyAlgorithm::Dsa, KeyHalf::Public, alias, None)
    }

    pub fn build_dsa_private_key(
        &self,
        creds: &Credentials,
        alias: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.build_key_half(KeyAlgorithm::Dsa, KeyHalf::Private, alias, Some(creds))
    }

    fn build_key_half(
        &self,
        algorithm: KeyAlgorithm,
        half: KeyHalf,
        alias: &str,
        creds: Option<&Credentials>,
    ) -> Result<HttpRequest, ApiError> {
        let path = format!("{}/{}", algorithm.as_str(), half.as_str());
        match creds {
            Some(creds) => self.get(
                &path,
                &[
                    ("alias", alias),
                    ("password", &creds.password),
                    ("keystoreName", &creds.keystore_name),
                ],
            ),
            None => self.get(&path, &[("alias", alias)]),
        }
    }

    // -----------------------------------------------------------------------
    // Alias listings
    // -----------------------------------------------------------------------

    /// Credentials travel as headers on this endpoint, not in the query.
    pub fn build_list_aliases(&self, creds: &Credentials) -> Result<HttpRequest, ApiError> {
        Ok(self.get("aliases", &[])?.with_headers([
            ("password", creds.password.as_str()),
            ("keystoreName", creds.keystore_name.as_str()),
        ]))
    }

    pub fn build_filter_aliases(
        &self,
        creds: &Credentials,
        filter: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = FilterAliases {
            password: creds.password.clone(),
            filter: filter.to_string(),
            keystore_name: creds.keystore_name.clone(),
        };
        self.post("filter-aliases", &body)
    }

    pub fn build_public_keys(&self) -> Result<HttpRequest, ApiError> {
        Ok(self
            .get("public-keys", &[])?
            .with_header(SKIP_BROWSER_WARNING.0, SKIP_BROWSER_WARNING.1))
    }

    // -----------------------------------------------------------------------
    // Cipher and signature operations
    // -----------------------------------------------------------------------

    pub fn build_encrypt_aes(
        &self,
        creds: &Credentials,
        alias: &str,
        plain_text: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.post("encrypt/aes", &plain_text_request(creds, alias, plain_text))
    }

    pub fn build_decrypt_aes(
        &self,
        creds: &Credentials,
        alias: &str,
        cipher_text: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.post("decrypt/aes", &cipher_text_request(creds, alias, cipher_text))
    }

    /// Encryption under a published RSA key needs no keystore credentials.
    pub fn build_encrypt_rsa(&self, alias: &str, plain_text: &str) -> Result<HttpRequest, ApiError> {
        let body = PublicEncrypt {
            plain_text: plain_text.to_string(),
            alias: alias.to_string(),
        };
        self.post("encrypt/rsa", &body)
    }

    pub fn build_decrypt_rsa(
        &self,
        creds: &Credentials,
        alias: &str,
        cipher_text: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.post("decrypt/rsa", &cipher_text_request(creds, alias, cipher_text))
    }

    pub fn build_sign_text(
        &self,
        creds: &Credentials,
        alias: &str,
        plain_text: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.post("sign-text", &plain_text_request(creds, alias, plain_text))
    }

    pub fn build_verify_signature(
        &self,
        alias: &str,
        text: &str,
        signature: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = VerifySignature {
            alias: alias.to_string(),
            text: text.to_string(),
            signature: signature.to_string(),
        };
        self.post("verify-text", &body)
    }

    // -----------------------------------------------------------------------
    // Response parsing
    // -----------------------------------------------------------------------

    /// Classify the response and unwrap any HTML shell around the body.
    pub fn parse_payload(&self, response: &HttpResponse) -> Result<Payload, ApiError> {
        classify(response).map(normalize)
    }

    /// Key material, ciphertext, plaintext or a signature, as display text.
    pub fn parse_text(&self, response: &HttpResponse) -> Result<String, ApiError> {
        self.parse_payload(response).map(Payload::into_text)
    }

    /// Success with a body nobody reads.
    pub fn parse_empty(&self, response: &HttpResponse) -> Result<(), ApiError> {
        classify(response).map(|_| ())
    }

    /// A list of aliases. The list may arrive as a JSON body or as JSON text
    /// that went through the HTML shell.
    pub fn parse_aliases(&self, response: &HttpResponse) -> Result<Vec<String>, ApiError> {
        let value = match self.parse_payload(response)? {
            Payload::ParsedJson(value) => value,
            Payload::PlainText(text) | Payload::HtmlWrapped(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(Vec::new());
                }
                serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))?
            }
        };
        serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// The verdict of `verify-text`.
    pub fn parse_verdict(&self, response: &HttpResponse) -> Result<bool, ApiError> {
        match self.parse_payload(response)? {
            Payload::ParsedJson(Value::Bool(verdict)) => Ok(verdict),
            payload => {
                let text = payload.into_text();
                let trimmed = text.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(ApiError::Parse(format!("unexpected verdict: {trimmed}")))
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Descriptor assembly
    // -----------------------------------------------------------------------

    fn base_request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url).with_headers(
            self.config
                .default_headers()
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<HttpRequest, ApiError> {
        let mut url = self.config.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(self.base_request(HttpMethod::Get, url.into()))
    }

    fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<HttpRequest, ApiError> {
        let url = self.config.endpoint(path)?;
        self.base_request(HttpMethod::Post, url.into())
            .with_json_body(body)
    }
}

fn access(creds: &Credentials) -> KeystoreAccess {
    KeystoreAccess {
        password: creds.password.clone(),
        name: creds.keystore_name.clone(),
    }
}

fn plain_text_request(creds: &Credentials, alias: &str, plain_text: &str) -> PlainTextRequest {
    PlainTextRequest {
        plain_text: plain_text.to_string(),
        alias: alias.to_string(),
        password: creds.password.clone(),
        keystore_name: creds.keystore_name.clone(),
    }
}

fn cipher_text_request(creds: &Credentials, alias: &str, cipher_text: &str) -> CipherTextRequest {
    CipherTextRequest {
        cipher_text: cipher_text.to_string(),
        alias: alias.to_string(),
        password: creds.password.clone(),
        keystore_name: creds.keystore_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rejection;

    const BASE: &str = "http://localhost:3000/api/crypto/";

    fn client() -> KeystoreClient {
        KeystoreClient::new(ClientConfig::new(BASE).unwrap())
    }

    fn creds() -> Credentials {
        Credentials::new("p", "n")
    }

    fn body(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: body.to_string(),
        }
    }

    #[test]
    fn build_create_keystore_produces_correct_request() {
        let req = client().build_create_keystore(&creds()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, format!("{BASE}create-keystore"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(body(&req), serde_json::json!({"password": "p", "name": "n"}));
    }

    #[test]
    fn build_generate_key_targets_family_endpoint() {
        let req = client()
            .build_generate_key(KeyAlgorithm::Dsa, &creds(), "k", KeySize(1024), None)
            .unwrap();
        assert_eq!(req.url, format!("{BASE}generate/dsa"));
        let json = body(&req);
        assert_eq!(json["keySize"], "1024");
        assert_eq!(json["alias"], "k");
        assert!(json.get("randomAlgorithm").is_none());
    }

    #[test]
    fn build_load_aes_key_uses_query_string() {
        let req = client().build_load_aes_key(&creds(), "aes_my key").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            format!("{BASE}load/aes?alias=aes_my+key&password=p&keystoreName=n")
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn build_key_halves() {
        let c = client();
        assert_eq!(
            c.build_rsa_public_key("rsa_a").unwrap().url,
            format!("{BASE}rsa/public?alias=rsa_a")
        );
        assert_eq!(
            c.build_dsa_private_key(&creds(), "dsa_a").unwrap().url,
            format!("{BASE}dsa/private?alias=dsa_a&password=p&keystoreName=n")
        );
    }

    #[test]
    fn build_list_aliases_sends_credentials_as_headers() {
        let req = client().build_list_aliases(&creds()).unwrap();
        assert_eq!(req.url, format!("{BASE}aliases"));
        assert_eq!(req.header("password"), Some("p"));
        assert_eq!(req.header("keystoreName"), Some("n"));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_public_keys_skips_browser_warning() {
        let req = client().build_public_keys().unwrap();
        assert_eq!(req.header("ngrok-skip-browser-warning"), Some("true"));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn build_encrypt_rsa_has_no_credentials() {
        let req = client().build_encrypt_rsa("rsa_a", "hi").unwrap();
        assert_eq!(
            body(&req),
            serde_json::json!({"plainText": "hi", "alias": "rsa_a"})
        );
    }

    #[test]
    fn build_verify_signature_body() {
        let req = client().build_verify_signature("dsa_a", "t", "s").unwrap();
        assert_eq!(req.url, format!("{BASE}verify-text"));
        assert_eq!(
            body(&req),
            serde_json::json!({"alias": "dsa_a", "text": "t", "signature": "s"})
        );
    }

    #[test]
    fn default_headers_apply_and_defer_to_call_headers() {
        let config = ClientConfig::new(BASE)
            .unwrap()
            .with_default_header("X-Client", "cli")
            .with_default_header("ngrok-skip-browser-warning", "false");
        let c = KeystoreClient::new(config);
        let req = c.build_public_keys().unwrap();
        assert_eq!(req.header("x-client"), Some("cli"));
        assert_eq!(req.header("ngrok-skip-browser-warning"), Some("true"));
    }

    #[test]
    fn parse_text_unwraps_html_shell() {
        let resp = response(200, "text/html", r#"<div id="root" data-payload="KEY"></div>"#);
        assert_eq!(client().parse_text(&resp).unwrap(), "KEY");
    }

    #[test]
    fn parse_aliases_from_json_body() {
        let resp = response(200, "application/json", r#"["aes_a","aes_b"]"#);
        assert_eq!(client().parse_aliases(&resp).unwrap(), vec!["aes_a", "aes_b"]);
    }

    #[test]
    fn parse_aliases_from_wrapped_json() {
        let resp = response(
            200,
            "text/html",
            r#"<div id="root" data-payload="[&quot;dsa_a_public&quot;]"></div>"#,
        );
        assert_eq!(client().parse_aliases(&resp).unwrap(), vec!["dsa_a_public"]);
    }

    #[test]
    fn parse_aliases_empty_text_is_empty_list() {
        let resp = response(200, "text/plain", "");
        assert!(client().parse_aliases(&resp).unwrap().is_empty());
    }

    #[test]
    fn parse_aliases_bad_shape() {
        let resp = response(200, "application/json", r#"{"aliases":[]}"#);
        assert!(matches!(
            client().parse_aliases(&resp),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn parse_verdict_variants() {
        let c = client();
        assert!(c.parse_verdict(&response(200, "application/json", "true")).unwrap());
        assert!(!c.parse_verdict(&response(200, "text/plain", " False\n")).unwrap());
        assert!(matches!(
            c.parse_verdict(&response(200, "text/plain", "maybe")),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn parse_text_rejection() {
        let resp = response(401, "text/plain", "Wrong password");
        let err = client().parse_text(&resp).unwrap_err();
        assert_eq!(err.rejection(), Some(&Rejection::new(401, "Wrong password")));
    }

    #[test]
    fn parse_empty_ignores_body() {
        let resp = response(201, "text/plain", "Keystore created");
        assert!(client().parse_empty(&resp).is_ok());
    }
}
