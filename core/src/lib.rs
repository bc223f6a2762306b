//! Synchronous API client core for the remote keystore service.
//!
//! # Overview
//! Builds `HttpRequest` values and classifies `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `KeystoreClient` is stateless: it holds only a `ClientConfig`.
//!   Credentials are passed into each call that needs them.
//! - `transport::classify` turns a raw response into a decoded body or an
//!   `ApiError::Rejected` carrying `{status, ok: false, message}`.
//! - `normalize::normalize` unwraps bodies that arrive inside an HTML shell,
//!   producing a tagged `Payload`.
//! - `validate` holds the checks a front-end runs before sending anything.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod alias;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod transport;
pub mod types;
pub mod validate;

pub use client::KeystoreClient;
pub use config::{ClientConfig, Credentials};
pub use error::{ApiError, Rejection};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use normalize::{extract_payload, normalize, Payload};
pub use transport::{classify, decode_body, ResponseBody};
pub use types::{KeyAlgorithm, KeyHalf, KeySize, RandomAlgorithm};
pub use validate::ValidationError;
