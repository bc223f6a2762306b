//! Client-side checks run before any request is sent.

use crate::alias;
use crate::types::{KeyAlgorithm, KeySize};

/// A form-level problem caught locally. Messages are shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please give the key a name.")]
    MissingKeyName,

    #[error("Please select a key size.")]
    MissingKeySize,

    #[error("Name already Exists. Please choose another name.")]
    DuplicateAlias(String),

    #[error("You need to generate a key first.")]
    NoKeySelected,

    #[error("Enter the text to encrypt/decrypt.")]
    MissingText,

    #[error("Enter the signature to verify.")]
    MissingSignature,

    #[error("Keystore name and password are required.")]
    MissingCredentials,
}

/// Check a key generation form and return the alias the key will be stored
/// under.
///
/// `existing` holds every alias already taken in the family, including
/// published public keys with their suffix removed.
pub fn new_key(
    algorithm: KeyAlgorithm,
    name: &str,
    key_size: Option<KeySize>,
    existing: &[String],
) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingKeyName);
    }
    if key_size.is_none() {
        return Err(ValidationError::MissingKeySize);
    }
    let qualified = alias::qualified(algorithm, name);
    if existing.iter().any(|taken| *taken == qualified) {
        return Err(ValidationError::DuplicateAlias(qualified));
    }
    Ok(qualified)
}

pub fn selected_key(alias: Option<&str>) -> Result<&str, ValidationError> {
    alias
        .filter(|alias| !alias.trim().is_empty())
        .ok_or(ValidationError::NoKeySelected)
}

pub fn text(text: &str) -> Result<&str, ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::MissingText);
    }
    Ok(text)
}

pub fn signature(signature: &str) -> Result<&str, ValidationError> {
    if signature.trim().is_empty() {
        return Err(ValidationError::MissingSignature);
    }
    Ok(signature)
}

pub fn credentials(password: &str, keystore_name: &str) -> Result<(), ValidationError> {
    if password.is_empty() || keystore_name.trim().is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}
