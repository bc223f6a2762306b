//! Encryption, decryption, signing and signature verification.

use keystore_core::validate;

use crate::args::KeyText;

use super::{read_operand, CommandError, Outcome, Session, EXIT_INVALID_SIGNATURE};

pub fn encrypt_aes(session: &Session, key: &KeyText) -> Result<Outcome, CommandError> {
    let creds = session.credentials()?;
    let (alias, text) = operands(key)?;
    let cipher = session.text(session.client().build_encrypt_aes(creds, alias, &text))?;
    Ok(Outcome::success(cipher, ""))
}

pub fn decrypt_aes(session: &Session, key: &KeyText) -> Result<Outcome, CommandError> {
    let creds = session.credentials()?;
    let (alias, text) = operands(key)?;
    let plain = session.text(session.client().build_decrypt_aes(creds, alias, &text))?;
    Ok(Outcome::success(plain, ""))
}

/// Works for any published RSA key, so no credentials are required.
pub fn encrypt_rsa(session: &Session, key: &KeyText) -> Result<Outcome, CommandError> {
    let (alias, text) = operands(key)?;
    let cipher = session.text(session.client().build_encrypt_rsa(alias, &text))?;
    Ok(Outcome::success(cipher, ""))
}

pub fn decrypt_rsa(session: &Session, key: &KeyText) -> Result<Outcome, CommandError> {
    let creds = session.credentials()?;
    let (alias, text) = operands(key)?;
    let plain = session.text(session.client().build_decrypt_rsa(creds, alias, &text))?;
    Ok(Outcome::success(plain, ""))
}

pub fn sign(session: &Session, key: &KeyText) -> Result<Outcome, CommandError> {
    let creds = session.credentials()?;
    let (alias, text) = operands(key)?;
    let signature = session.text(session.client().build_sign_text(creds, alias, &text))?;
    tracing::info!(%alias, "text signed");
    Ok(Outcome::success(signature, ""))
}

/// An invalid signature is a normal result, reported with its own exit code.
pub fn verify(session: &Session, key: &KeyText, signature: &str) -> Result<Outcome, CommandError> {
    let (alias, text) = operands(key)?;
    let signature = validate::signature(signature)?;
    let valid = session.verdict(
        session
            .client()
            .build_verify_signature(alias, &text, signature),
    )?;
    tracing::info!(%alias, valid, "signature checked");
    if valid {
        Ok(Outcome::success("Signature is valid.", "Signature is valid."))
    } else {
        let mut outcome = Outcome::warning("Signature is invalid.", "Signature is invalid.");
        outcome.exit_code = EXIT_INVALID_SIGNATURE;
        Ok(outcome)
    }
}

/// The selected alias and a non-empty text operand.
fn operands(key: &KeyText) -> Result<(&str, String), CommandError> {
    let alias = validate::selected_key(Some(key.alias.as_str()))?;
    let text = read_operand(&key.source)?;
    validate::text(&text)?;
    Ok((alias, text))
}
