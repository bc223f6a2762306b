//! Domain DTOs for the keystore API.
//!
//! # Design
//! Field names follow the service's camelCase JSON. These types are defined
//! independently from the mock-server crate; integration tests catch any
//! schema drift between the two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Key family a stored alias belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Aes,
    Rsa,
    Dsa,
}

impl KeyAlgorithm {
    /// Path segment used by the `generate/*`, `load/*` and key endpoints.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyAlgorithm::Aes => "aes",
            KeyAlgorithm::Rsa => "rsa",
            KeyAlgorithm::Dsa => "dsa",
        }
    }

    /// Prefix the service puts in front of every alias of this family.
    pub fn alias_prefix(self) -> &'static str {
        match self {
            KeyAlgorithm::Aes => "aes_",
            KeyAlgorithm::Rsa => "rsa_",
            KeyAlgorithm::Dsa => "dsa_",
        }
    }

    /// Whether keys of this family have a published public half.
    pub fn is_asymmetric(self) -> bool {
        !matches!(self, KeyAlgorithm::Aes)
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of an asymmetric key pair to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHalf {
    Public,
    Private,
}

impl KeyHalf {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyHalf::Public => "public",
            KeyHalf::Private => "private",
        }
    }
}

/// Key length in bits. Sent to the service as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct KeySize(pub u32);

impl From<KeySize> for String {
    fn from(size: KeySize) -> Self {
        size.0.to_string()
    }
}

impl TryFrom<String> for KeySize {
    type Error = std::num::ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for KeySize {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(KeySize)
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Randomness source the service seeds key generation with.
///
/// Unknown names are passed through untouched so newer server-side sources
/// work without a client release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RandomAlgorithm {
    Drbg,
    NonceAndIv,
    Sha1Prng,
    Other(String),
}

impl RandomAlgorithm {
    pub fn as_str(&self) -> &str {
        match self {
            RandomAlgorithm::Drbg => "DRBG",
            RandomAlgorithm::NonceAndIv => "NONCEANDIV",
            RandomAlgorithm::Sha1Prng => "SHA1PRNG",
            RandomAlgorithm::Other(name) => name,
        }
    }
}

impl From<String> for RandomAlgorithm {
    fn from(value: String) -> Self {
        match value.as_str() {
            "DRBG" => RandomAlgorithm::Drbg,
            "NONCEANDIV" => RandomAlgorithm::NonceAndIv,
            "SHA1PRNG" => RandomAlgorithm::Sha1Prng,
            _ => RandomAlgorithm::Other(value),
        }
    }
}

impl From<RandomAlgorithm> for String {
    fn from(value: RandomAlgorithm) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for RandomAlgorithm {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RandomAlgorithm::from(s.to_string()))
    }
}

impl fmt::Display for RandomAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `create-keystore` and `login-keystore`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeystoreAccess {
    pub password: String,
    pub name: String,
}

/// Body of the `generate/{aes,rsa,dsa}` endpoints.
///
/// `alias` is the bare name; the service stores it under the family prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKey {
    pub key_size: KeySize,
    pub alias: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_algorithm: Option<RandomAlgorithm>,
    pub keystore_name: String,
}

/// Body of `encrypt/aes` and `sign-text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlainTextRequest {
    pub plain_text: String,
    pub alias: String,
    pub password: String,
    pub keystore_name: String,
}

/// Body of `decrypt/aes` and `decrypt/rsa`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CipherTextRequest {
    pub cipher_text: String,
    pub alias: String,
    pub password: String,
    pub keystore_name: String,
}

/// Body of `encrypt/rsa`. Encrypting under a public key needs no keystore
/// credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicEncrypt {
    pub plain_text: String,
    pub alias: String,
}

/// Body of `filter-aliases`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterAliases {
    pub password: String,
    pub filter: String,
    pub keystore_name: String,
}

/// Body of `verify-text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifySignature {
    pub alias: String,
    pub text: String,
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_key_serializes_camel_case_with_string_size() {
        let body = GenerateKey {
            key_size: KeySize(256),
            alias: "mykey".into(),
            password: "p".into(),
            random_algorithm: Some(RandomAlgorithm::Drbg),
            keystore_name: "n".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "keySize": "256",
                "alias": "mykey",
                "password": "p",
                "randomAlgorithm": "DRBG",
                "keystoreName": "n"
            })
        );
    }

    #[test]
    fn generate_key_omits_unset_random_algorithm() {
        let body = GenerateKey {
            key_size: KeySize(1024),
            alias: "k".into(),
            password: "p".into(),
            random_algorithm: None,
            keystore_name: "n".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("randomAlgorithm").is_none());
    }

    #[test]
    fn unknown_random_algorithm_passes_through() {
        let algo: RandomAlgorithm = "Windows-PRNG".parse().unwrap();
        assert_eq!(algo, RandomAlgorithm::Other("Windows-PRNG".into()));
        assert_eq!(serde_json::to_string(&algo).unwrap(), r#""Windows-PRNG""#);
        let known: RandomAlgorithm = serde_json::from_str(r#""SHA1PRNG""#).unwrap();
        assert_eq!(known, RandomAlgorithm::Sha1Prng);
    }

    #[test]
    fn key_size_parses_and_rejects_garbage() {
        assert_eq!(" 2048 ".parse::<KeySize>().unwrap(), KeySize(2048));
        assert!("big".parse::<KeySize>().is_err());
        let parsed: KeySize = serde_json::from_str(r#""192""#).unwrap();
        assert_eq!(parsed, KeySize(192));
    }

    #[test]
    fn cipher_text_request_field_names() {
        let body = CipherTextRequest {
            cipher_text: "c".into(),
            alias: "aes_k".into(),
            password: "p".into(),
            keystore_name: "n".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["cipherText"], "c");
        assert_eq!(json["keystoreName"], "n");
    }

    #[test]
    fn algorithm_prefixes() {
        assert_eq!(KeyAlgorithm::Dsa.alias_prefix(), "dsa_");
        assert!(KeyAlgorithm::Rsa.is_asymmetric());
        assert!(!KeyAlgorithm::Aes.is_asymmetric());
    }
}
