//! In-memory stand-in for the remote keystore service.
//!
//! Serves the `/api/crypto/` endpoints with the same request and response
//! shapes as the real backend, including its habit of answering errors with
//! either a JSON `{"message": ..}` object or bare text. With
//! `MockOptions::wrap_html` set, every successful body is delivered inside
//! the HTML shell a tunnelling proxy produces.

pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

use store::{Algorithm, Store, StoreError};

pub const API_PREFIX: &str = "/api/crypto";

#[derive(Debug, Clone, Copy, Default)]
pub struct MockOptions {
    /// Deliver successful bodies as `<div id="root" data-payload="..">`.
    pub wrap_html: bool,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    options: MockOptions,
}

#[derive(Deserialize)]
pub struct KeystoreAccess {
    pub password: String,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKey {
    pub key_size: String,
    pub alias: String,
    pub password: String,
    #[serde(default)]
    pub random_algorithm: Option<String>,
    pub keystore_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainTextRequest {
    pub plain_text: String,
    pub alias: String,
    pub password: String,
    pub keystore_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherTextRequest {
    pub cipher_text: String,
    pub alias: String,
    pub password: String,
    pub keystore_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicEncrypt {
    pub plain_text: String,
    pub alias: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterAliases {
    pub password: String,
    pub filter: String,
    pub keystore_name: String,
}

#[derive(Deserialize)]
pub struct VerifySignature {
    pub alias: String,
    pub text: String,
    pub signature: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyQuery {
    pub alias: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub keystore_name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
}

/// Failure replies. The backend is inconsistent about error bodies, so both
/// shapes are produced.
#[derive(Debug)]
pub enum MockError {
    Json(StatusCode, String),
    Text(StatusCode, String),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        match self {
            MockError::Json(status, message) => (status, Json(ErrorBody { message })).into_response(),
            MockError::Text(status, message) => (status, message).into_response(),
        }
    }
}

impl From<StoreError> for MockError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::KeystoreExists => {
                MockError::Text(StatusCode::CONFLICT, "Keystore already exists".into())
            }
            StoreError::Unauthorized => MockError::Text(
                StatusCode::UNAUTHORIZED,
                "Invalid keystore name or password".into(),
            ),
            StoreError::UnsupportedKeySize(size) => MockError::Json(
                StatusCode::BAD_REQUEST,
                format!("unsupported key size: {size}"),
            ),
            StoreError::UnsupportedRandom(name) => MockError::Json(
                StatusCode::BAD_REQUEST,
                format!("unsupported random algorithm: {name}"),
            ),
            StoreError::AliasExists(alias) => {
                MockError::Json(StatusCode::CONFLICT, format!("alias already exists: {alias}"))
            }
            StoreError::AliasNotFound(_) => {
                MockError::Json(StatusCode::NOT_FOUND, "alias not found".into())
            }
            StoreError::InvalidCipherText => {
                MockError::Text(StatusCode::BAD_REQUEST, "Invalid ciphertext".into())
            }
        }
    }
}

pub fn app() -> Router {
    app_with(MockOptions::default())
}

pub fn app_with(options: MockOptions) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        options,
    };
    let api = Router::new()
        .route("/create-keystore", post(create_keystore))
        .route("/login-keystore", post(login_keystore))
        .route("/generate/{algorithm}", post(generate_key))
        .route("/load/aes", get(load_aes))
        .route("/encrypt/aes", post(encrypt_aes))
        .route("/decrypt/aes", post(decrypt_aes))
        .route("/encrypt/rsa", post(encrypt_rsa))
        .route("/decrypt/rsa", post(decrypt_rsa))
        .route("/rsa/public", get(rsa_public))
        .route("/rsa/private", get(rsa_private))
        .route("/dsa/public", get(dsa_public))
        .route("/dsa/private", get(dsa_private))
        .route("/sign-text", post(sign_text))
        .route("/verify-text", post(verify_text))
        .route("/aliases", get(list_aliases))
        .route("/filter-aliases", post(filter_aliases))
        .route("/public-keys", get(public_keys))
        .with_state(state);
    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockOptions::default()).await
}

pub async fn run_with(listener: TcpListener, options: MockOptions) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

/// The page a tunnelling proxy turns a plain body into.
pub fn html_shell(payload: &str) -> String {
    let mut escaped = String::with_capacity(payload.len());
    for c in payload.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>\
         <body><div id=\"root\" data-payload=\"{escaped}\"></div></body></html>"
    )
}

fn text_reply(options: MockOptions, status: StatusCode, text: String) -> Response {
    if options.wrap_html {
        (
            status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html_shell(&text),
        )
            .into_response()
    } else {
        (status, text).into_response()
    }
}

fn list_reply(options: MockOptions, aliases: Vec<String>) -> Response {
    if options.wrap_html {
        let json = serde_json::Value::from(aliases).to_string();
        text_reply(options, StatusCode::OK, json)
    } else {
        Json(aliases).into_response()
    }
}

async fn create_keystore(
    State(state): State<AppState>,
    Json(input): Json<KeystoreAccess>,
) -> Result<Response, MockError> {
    state.db.write().await.create(&input.name, &input.password)?;
    tracing::info!(keystore = %input.name, "keystore created");
    Ok(text_reply(state.options, StatusCode::CREATED, "Keystore created".into()))
}

async fn login_keystore(
    State(state): State<AppState>,
    Json(input): Json<KeystoreAccess>,
) -> Result<Response, MockError> {
    state.db.read().await.open(&input.name, &input.password)?;
    Ok(text_reply(state.options, StatusCode::OK, "Login successful".into()))
}

async fn generate_key(
    State(state): State<AppState>,
    Path(algorithm): Path<String>,
    Json(input): Json<GenerateKey>,
) -> Result<Response, MockError> {
    let algorithm = Algorithm::parse(&algorithm).ok_or_else(|| {
        MockError::Json(StatusCode::NOT_FOUND, format!("unknown algorithm: {algorithm}"))
    })?;
    let mut db = state.db.write().await;
    let keystore = db.open_mut(&input.keystore_name, &input.password)?;
    let random = input.random_algorithm.as_deref().filter(|r| !r.is_empty());
    let key = keystore.generate(algorithm, &input.alias, &input.key_size, random)?;
    tracing::info!(alias = %input.alias, ?algorithm, "key generated");
    match algorithm {
        Algorithm::Aes => Ok(text_reply(state.options, StatusCode::OK, key.private_material())),
        Algorithm::Rsa | Algorithm::Dsa => Ok(StatusCode::CREATED.into_response()),
    }
}

async fn load_aes(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, MockError> {
    private_key(state, Algorithm::Aes, query).await
}

async fn rsa_public(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, MockError> {
    public_key(state, Algorithm::Rsa, query).await
}

async fn rsa_private(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, MockError> {
    private_key(state, Algorithm::Rsa, query).await
}

async fn dsa_public(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, MockError> {
    public_key(state, Algorithm::Dsa, query).await
}

async fn dsa_private(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, MockError> {
    private_key(state, Algorithm::Dsa, query).await
}

async fn private_key(
    state: AppState,
    algorithm: Algorithm,
    query: KeyQuery,
) -> Result<Response, MockError> {
    let db = state.db.read().await;
    let key = db
        .open(&query.keystore_name, &query.password)?
        .key(&query.alias, algorithm)?;
    Ok(text_reply(state.options, StatusCode::OK, key.private_material()))
}

async fn public_key(
    state: AppState,
    algorithm: Algorithm,
    query: KeyQuery,
) -> Result<Response, MockError> {
    let db = state.db.read().await;
    let material = db
        .published(&query.alias, algorithm)?
        .public_material()
        .ok_or_else(|| StoreError::AliasNotFound(query.alias.clone()))?;
    Ok(text_reply(state.options, StatusCode::OK, material))
}

async fn encrypt_aes(
    State(state): State<AppState>,
    Json(input): Json<PlainTextRequest>,
) -> Result<Response, MockError> {
    let db = state.db.read().await;
    let key = db
        .open(&input.keystore_name, &input.password)?
        .key(&input.alias, Algorithm::Aes)?;
    Ok(text_reply(state.options, StatusCode::OK, key.seal(&input.plain_text)))
}

async fn decrypt_aes(
    State(state): State<AppState>,
    Json(input): Json<CipherTextRequest>,
) -> Result<Response, MockError> {
    decrypt(state, Algorithm::Aes, input).await
}

async fn decrypt_rsa(
    State(state): State<AppState>,
    Json(input): Json<CipherTextRequest>,
) -> Result<Response, MockError> {
    decrypt(state, Algorithm::Rsa, input).await
}

async fn decrypt(
    state: AppState,
    algorithm: Algorithm,
    input: CipherTextRequest,
) -> Result<Response, MockError> {
    let db = state.db.read().await;
    let key = db
        .open(&input.keystore_name, &input.password)?
        .key(&input.alias, algorithm)?;
    let plain = key.open(&input.cipher_text)?;
    Ok(text_reply(state.options, StatusCode::OK, plain))
}

async fn encrypt_rsa(
    State(state): State<AppState>,
    Json(input): Json<PublicEncrypt>,
) -> Result<Response, MockError> {
    let db = state.db.read().await;
    let key = db.published(&input.alias, Algorithm::Rsa)?;
    Ok(text_reply(state.options, StatusCode::OK, key.seal(&input.plain_text)))
}

async fn sign_text(
    State(state): State<AppState>,
    Json(input): Json<PlainTextRequest>,
) -> Result<Response, MockError> {
    let db = state.db.read().await;
    let key = db
        .open(&input.keystore_name, &input.password)?
        .key(&input.alias, Algorithm::Dsa)?;
    Ok(text_reply(state.options, StatusCode::OK, key.seal(&input.plain_text)))
}

async fn verify_text(
    State(state): State<AppState>,
    Json(input): Json<VerifySignature>,
) -> Result<Response, MockError> {
    let db = state.db.read().await;
    let key = db.published(&input.alias, Algorithm::Dsa)?;
    let valid = key.seal(&input.text) == input.signature.trim();
    if state.options.wrap_html {
        Ok(text_reply(state.options, StatusCode::OK, valid.to_string()))
    } else {
        Ok(Json(valid).into_response())
    }
}

async fn list_aliases(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, MockError> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let db = state.db.read().await;
    let keystore = db.open(&header("keystorename"), &header("password"))?;
    Ok(list_reply(state.options, keystore.aliases().cloned().collect()))
}

async fn filter_aliases(
    State(state): State<AppState>,
    Json(input): Json<FilterAliases>,
) -> Result<Response, MockError> {
    let db = state.db.read().await;
    let keystore = db.open(&input.keystore_name, &input.password)?;
    let aliases = keystore
        .aliases()
        .filter(|alias| alias.starts_with(&input.filter))
        .cloned()
        .collect();
    Ok(list_reply(state.options, aliases))
}

async fn public_keys(State(state): State<AppState>) -> Response {
    let listing = state.db.read().await.public_listing();
    list_reply(state.options, listing)
}
