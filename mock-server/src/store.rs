//! In-memory keystores backing the mock service.
//!
//! The "cryptography" here is a reversible XOR over a random per-key secret,
//! hex encoded. It exists so round trips through the mock behave like the
//! real service; it offers no protection whatsoever.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use uuid::Uuid;

pub const RANDOM_ALGORITHMS: [&str; 3] = ["DRBG", "NONCEANDIV", "SHA1PRNG"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Aes,
    Rsa,
    Dsa,
}

impl Algorithm {
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "aes" => Some(Algorithm::Aes),
            "rsa" => Some(Algorithm::Rsa),
            "dsa" => Some(Algorithm::Dsa),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Algorithm::Aes => "aes_",
            Algorithm::Rsa => "rsa_",
            Algorithm::Dsa => "dsa_",
        }
    }

    pub fn key_sizes(self) -> &'static [u32] {
        match self {
            Algorithm::Aes => &[128, 192, 256],
            Algorithm::Rsa => &[1024, 2048, 4096],
            Algorithm::Dsa => &[512, 1024, 2048],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    KeystoreExists,
    Unauthorized,
    UnsupportedKeySize(String),
    UnsupportedRandom(String),
    AliasExists(String),
    AliasNotFound(String),
    InvalidCipherText,
}

#[derive(Debug, Clone)]
pub struct StoredKey {
    pub algorithm: Algorithm,
    secret: String,
}

impl StoredKey {
    fn generate(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            secret: Uuid::new_v4().simple().to_string(),
        }
    }

    /// The secret key (AES) or private half (RSA/DSA).
    pub fn private_material(&self) -> String {
        match self.algorithm {
            Algorithm::Aes => self.secret.clone(),
            _ => pem("PRIVATE KEY", &self.secret),
        }
    }

    pub fn public_material(&self) -> Option<String> {
        match self.algorithm {
            Algorithm::Aes => None,
            _ => Some(pem("PUBLIC KEY", &self.secret.chars().rev().collect::<String>())),
        }
    }

    pub fn seal(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        for (byte, k) in text.bytes().zip(self.secret.bytes().cycle()) {
            let _ = write!(out, "{:02x}", byte ^ k);
        }
        out
    }

    pub fn open(&self, hex: &str) -> Result<String, StoreError> {
        let hex = hex.trim();
        if hex.len() % 2 != 0 || !hex.is_ascii() {
            return Err(StoreError::InvalidCipherText);
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .zip(self.secret.bytes().cycle())
            .map(|(i, k)| u8::from_str_radix(&hex[i..i + 2], 16).map(|b| b ^ k))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| StoreError::InvalidCipherText)?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidCipherText)
    }
}

fn pem(label: &str, body: &str) -> String {
    format!("-----BEGIN {label}-----\n{body}\n-----END {label}-----")
}

#[derive(Debug, Default)]
pub struct Keystore {
    password: String,
    keys: BTreeMap<String, StoredKey>,
}

impl Keystore {
    pub fn aliases(&self) -> impl Iterator<Item = &String> {
        self.keys.keys()
    }

    pub fn key(&self, alias: &str, algorithm: Algorithm) -> Result<&StoredKey, StoreError> {
        self.keys
            .get(alias)
            .filter(|key| key.algorithm == algorithm)
            .ok_or_else(|| StoreError::AliasNotFound(alias.to_string()))
    }

    pub fn generate(
        &mut self,
        algorithm: Algorithm,
        name: &str,
        key_size: &str,
        random_algorithm: Option<&str>,
    ) -> Result<&StoredKey, StoreError> {
        let size_ok = key_size
            .parse::<u32>()
            .is_ok_and(|size| algorithm.key_sizes().contains(&size));
        if !size_ok {
            return Err(StoreError::UnsupportedKeySize(key_size.to_string()));
        }
        if let Some(random) = random_algorithm {
            if !RANDOM_ALGORITHMS.contains(&random) {
                return Err(StoreError::UnsupportedRandom(random.to_string()));
            }
        }
        let alias = format!("{}{name}", algorithm.prefix());
        if self.keys.contains_key(&alias) {
            return Err(StoreError::AliasExists(alias));
        }
        Ok(&*self
            .keys
            .entry(alias)
            .or_insert_with(|| StoredKey::generate(algorithm)))
    }
}

#[derive(Debug, Default)]
pub struct Store {
    keystores: HashMap<String, Keystore>,
}

impl Store {
    pub fn create(&mut self, name: &str, password: &str) -> Result<(), StoreError> {
        if self.keystores.contains_key(name) {
            return Err(StoreError::KeystoreExists);
        }
        self.keystores.insert(
            name.to_string(),
            Keystore {
                password: password.to_string(),
                keys: BTreeMap::new(),
            },
        );
        Ok(())
    }

    pub fn open(&self, name: &str, password: &str) -> Result<&Keystore, StoreError> {
        self.keystores
            .get(name)
            .filter(|ks| ks.password == password)
            .ok_or(StoreError::Unauthorized)
    }

    pub fn open_mut(&mut self, name: &str, password: &str) -> Result<&mut Keystore, StoreError> {
        self.keystores
            .get_mut(name)
            .filter(|ks| ks.password == password)
            .ok_or(StoreError::Unauthorized)
    }

    /// Look up a key pair by alias across every keystore; public halves are
    /// usable without credentials.
    pub fn published(&self, alias: &str, algorithm: Algorithm) -> Result<&StoredKey, StoreError> {
        self.keystores
            .values()
            .find_map(|ks| ks.key(alias, algorithm).ok())
            .filter(|key| key.algorithm != Algorithm::Aes)
            .ok_or_else(|| StoreError::AliasNotFound(alias.to_string()))
    }

    /// Every published key as `<alias>_public`, sorted.
    pub fn public_listing(&self) -> Vec<String> {
        let mut listing: Vec<String> = self
            .keystores
            .values()
            .flat_map(|ks| ks.keys.iter())
            .filter(|(_, key)| key.algorithm != Algorithm::Aes)
            .map(|(alias, _)| format!("{alias}_public"))
            .collect();
        listing.sort();
        listing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_keystore() -> Store {
        let mut store = Store::default();
        store.create("main", "pw").unwrap();
        store
    }

    #[test]
    fn seal_and_open_round_trip() {
        let key = StoredKey::generate(Algorithm::Aes);
        let sealed = key.seal("attack at dawn");
        assert_ne!(sealed, "attack at dawn");
        assert_eq!(key.open(&sealed).unwrap(), "attack at dawn");
    }

    #[test]
    fn open_rejects_garbage() {
        let key = StoredKey::generate(Algorithm::Rsa);
        assert_eq!(key.open("abc"), Err(StoreError::InvalidCipherText));
        assert_eq!(key.open("zz"), Err(StoreError::InvalidCipherText));
    }

    #[test]
    fn duplicate_keystore_is_refused() {
        let mut store = store_with_keystore();
        assert_eq!(store.create("main", "x"), Err(StoreError::KeystoreExists));
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let store = store_with_keystore();
        assert!(matches!(store.open("main", "nope"), Err(StoreError::Unauthorized)));
        assert!(matches!(store.open("other", "pw"), Err(StoreError::Unauthorized)));
    }

    #[test]
    fn generate_validates_and_prefixes() {
        let mut store = store_with_keystore();
        let ks = store.open_mut("main", "pw").unwrap();
        assert_eq!(
            ks.generate(Algorithm::Aes, "k", "100", None).unwrap_err(),
            StoreError::UnsupportedKeySize("100".into())
        );
        assert_eq!(
            ks.generate(Algorithm::Aes, "k", "128", Some("LCG")).unwrap_err(),
            StoreError::UnsupportedRandom("LCG".into())
        );
        ks.generate(Algorithm::Aes, "k", "128", Some("DRBG")).unwrap();
        assert_eq!(
            ks.generate(Algorithm::Aes, "k", "256", None).unwrap_err(),
            StoreError::AliasExists("aes_k".into())
        );
        assert_eq!(ks.aliases().collect::<Vec<_>>(), ["aes_k"]);
    }

    #[test]
    fn public_listing_skips_symmetric_keys() {
        let mut store = store_with_keystore();
        let ks = store.open_mut("main", "pw").unwrap();
        ks.generate(Algorithm::Aes, "a", "128", None).unwrap();
        ks.generate(Algorithm::Rsa, "r", "2048", None).unwrap();
        ks.generate(Algorithm::Dsa, "d", "1024", None).unwrap();
        assert_eq!(store.public_listing(), ["dsa_d_public", "rsa_r_public"]);
        assert!(store.published("aes_a", Algorithm::Aes).is_err());
        assert!(store.published("rsa_r", Algorithm::Rsa).is_ok());
    }
}
