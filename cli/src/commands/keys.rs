//! Keystore session, key generation, key material and alias listings.

use keystore_core::{alias, validate, KeyAlgorithm, KeyHalf, ValidationError};

use crate::args::{GenerateArgs, KeystoreCommands};

use super::{CommandError, Outcome, Session};

pub fn keystore(session: &Session, command: KeystoreCommands) -> Result<Outcome, CommandError> {
    let creds = session.credentials()?;
    let client = session.client();
    let request = match command {
        KeystoreCommands::Create => client.build_create_keystore(creds),
        KeystoreCommands::Login => client.build_login_keystore(creds),
    };
    let message = session.text(request)?;
    tracing::info!(keystore = %creds.keystore_name, ?command, "keystore ready");
    Ok(Outcome::success(String::new(), message))
}

/// Generate a key under `<prefix><name>`, refusing names already taken in
/// the keystore or among published keys of the same family.
///
/// AES returns the key material directly. For RSA and DSA the service only
/// acknowledges, so both halves are fetched afterwards; either fetch may fail
/// without failing the command.
pub fn generate(
    session: &Session,
    algorithm: KeyAlgorithm,
    args: &GenerateArgs,
) -> Result<Outcome, CommandError> {
    let creds = session.credentials()?;
    validate::new_key(algorithm, &args.name, args.size, &[])?;
    let taken = taken_aliases(session, algorithm)?;
    let alias = validate::new_key(algorithm, &args.name, args.size, &taken)?;
    let Some(size) = args.size else {
        return Err(ValidationError::MissingKeySize.into());
    };

    let request = session.client().build_generate_key(
        algorithm,
        creds,
        args.name.trim(),
        size,
        args.random.clone(),
    );

    if !algorithm.is_asymmetric() {
        let material = session.text(request)?;
        tracing::info!(%alias, %size, "key generated");
        return Ok(Outcome::success(material, format!("Key {alias} generated.")));
    }

    session.empty(request)?;
    tracing::info!(%alias, %size, "key pair generated");

    let mut sections = Vec::with_capacity(2);
    let mut incomplete = false;
    for (half, label) in [(KeyHalf::Private, "Private key"), (KeyHalf::Public, "Public key")] {
        match fetch_half(session, algorithm, half, &alias) {
            Ok(material) => sections.push(format!("{label}:\n{material}")),
            Err(e) => {
                tracing::warn!(%alias, half = half.as_str(), error = %e, "key fetch failed");
                incomplete = true;
                sections.push(format!("{label}:\nError fetching {} key.", half.as_str()));
            }
        }
    }
    let output = sections.join("\n\n");
    if incomplete {
        Ok(Outcome::warning(
            output,
            format!("Key pair {alias} generated, but could not be fetched in full."),
        ))
    } else {
        Ok(Outcome::success(output, format!("Key pair {alias} generated.")))
    }
}

pub fn load_aes(session: &Session, alias: &str) -> Result<Outcome, CommandError> {
    let alias = validate::selected_key(Some(alias))?;
    let material = fetch_half(session, KeyAlgorithm::Aes, KeyHalf::Private, alias)?;
    Ok(Outcome::success(material, ""))
}

pub fn key_half(
    session: &Session,
    algorithm: KeyAlgorithm,
    alias: &str,
    private: bool,
) -> Result<Outcome, CommandError> {
    let alias = validate::selected_key(Some(alias))?;
    let half = if private { KeyHalf::Private } else { KeyHalf::Public };
    let material = fetch_half(session, algorithm, half, alias)?;
    Ok(Outcome::success(material, ""))
}

/// Aliases of one family. With `public`, every key usable for encryption:
/// the keystore's own keys followed by published keys not already listed.
/// Credentials are optional in that case.
pub fn list(
    session: &Session,
    algorithm: KeyAlgorithm,
    public: bool,
) -> Result<Outcome, CommandError> {
    let own = match session.credentials() {
        Ok(creds) => session.aliases(
            session
                .client()
                .build_filter_aliases(creds, algorithm.alias_prefix()),
        )?,
        Err(_) if public => Vec::new(),
        Err(e) => return Err(e),
    };
    let aliases = if public {
        let listing = session.aliases(session.client().build_public_keys())?;
        alias::merge_unique(&own, &alias::published(algorithm, &listing))
    } else {
        own
    };
    Ok(listing_outcome(&aliases))
}

pub fn aliases(session: &Session, filter: Option<&str>) -> Result<Outcome, CommandError> {
    let creds = session.credentials()?;
    let request = match filter {
        Some(prefix) => session.client().build_filter_aliases(creds, prefix),
        None => session.client().build_list_aliases(creds),
    };
    Ok(listing_outcome(&session.aliases(request)?))
}

pub fn public_keys(session: &Session) -> Result<Outcome, CommandError> {
    let listing = session.aliases(session.client().build_public_keys())?;
    Ok(listing_outcome(&listing))
}

fn listing_outcome(aliases: &[String]) -> Outcome {
    if aliases.is_empty() {
        Outcome::warning(String::new(), ValidationError::NoKeySelected.to_string())
    } else {
        Outcome::success(aliases.join("\n"), format!("{} found.", count(aliases.len())))
    }
}

fn count(n: usize) -> String {
    if n == 1 {
        "1 alias".to_string()
    } else {
        format!("{n} aliases")
    }
}

/// Every alias a new key of `algorithm` must not collide with.
fn taken_aliases(session: &Session, algorithm: KeyAlgorithm) -> Result<Vec<String>, CommandError> {
    let creds = session.credentials()?;
    let own = session.aliases(
        session
            .client()
            .build_filter_aliases(creds, algorithm.alias_prefix()),
    )?;
    if !algorithm.is_asymmetric() {
        return Ok(own);
    }
    let listing = session.aliases(session.client().build_public_keys())?;
    Ok(alias::merge_unique(&own, &alias::published(algorithm, &listing)))
}

/// Key material for one half of a key. AES keys have only the secret half.
fn fetch_half(
    session: &Session,
    algorithm: KeyAlgorithm,
    half: KeyHalf,
    alias: &str,
) -> Result<String, CommandError> {
    let client = session.client();
    let request = match (algorithm, half) {
        (KeyAlgorithm::Aes, _) => client.build_load_aes_key(session.credentials()?, alias),
        (KeyAlgorithm::Rsa, KeyHalf::Public) => client.build_rsa_public_key(alias),
        (KeyAlgorithm::Rsa, KeyHalf::Private) => {
            client.build_rsa_private_key(session.credentials()?, alias)
        }
        (KeyAlgorithm::Dsa, KeyHalf::Public) => client.build_dsa_public_key(alias),
        (KeyAlgorithm::Dsa, KeyHalf::Private) => {
            client.build_dsa_private_key(session.credentials()?, alias)
        }
    };
    Ok(session.text(request)?)
}
