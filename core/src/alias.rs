//! Alias string helpers.
//!
//! Aliases are opaque to the client. The only structure relied on is the
//! family prefix (`aes_`, `rsa_`, `dsa_`) and the `_public` suffix the public
//! key listing appends.

use crate::types::KeyAlgorithm;

/// Suffix carried by entries of the public key listing.
pub const PUBLIC_SUFFIX: &str = "_public";

/// The alias the service stores a freshly generated key under.
pub fn qualified(algorithm: KeyAlgorithm, name: &str) -> String {
    format!("{}{name}", algorithm.alias_prefix())
}

pub fn belongs_to(alias: &str, algorithm: KeyAlgorithm) -> bool {
    alias.starts_with(algorithm.alias_prefix())
}

/// Drop the `_public` suffix, if present.
pub fn strip_public(alias: &str) -> &str {
    alias.strip_suffix(PUBLIC_SUFFIX).unwrap_or(alias)
}

/// Aliases of one family from the public key listing, suffix removed.
pub fn published(algorithm: KeyAlgorithm, listing: &[String]) -> Vec<String> {
    listing
        .iter()
        .map(|alias| strip_public(alias))
        .filter(|alias| belongs_to(alias, algorithm))
        .map(str::to_string)
        .collect()
}

/// Concatenate `first` and `second`, keeping the first occurrence of each alias.
pub fn merge_unique(first: &[String], second: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(first.len() + second.len());
    for alias in first.iter().chain(second) {
        if !merged.contains(alias) {
            merged.push(alias.clone());
        }
    }
    merged
}
