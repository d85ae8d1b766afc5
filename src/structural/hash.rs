//! Structural Hash Module
//!
//! Content fingerprints over the canonical serialization.

use base64::prelude::*;
use sha2::{Digest, Sha256};

use crate::error::{Result, StructError};
use crate::value::{to_canonical_string, to_tagged_string, Value};

/// Hex digits kept from the content digest (64 bits).
pub const CONTENT_KEY_LENGTH: usize = 16;

// == Hash ==
/// SHA-256 of the canonical serialization, base64 encoded.
///
/// # Errors
/// `StructError::Unhashable` for circular values, BigInts, and values with
/// no serialization at the top level.
pub fn hash(value: &Value) -> Result<String> {
    hash_with(value, sha256_base64)
}

/// Hashes the canonical serialization with a caller-supplied digest.
pub fn hash_with<F>(value: &Value, digest: F) -> Result<String>
where
    F: Fn(&str) -> String,
{
    let text = match to_canonical_string(value) {
        Ok(Some(text)) => text,
        Ok(None) => {
            return Err(StructError::Unhashable(format!(
                "{} has no canonical serialization",
                value.type_name()
            )))
        }
        Err(err) => return Err(unhashable(err)),
    };
    Ok(digest(&text))
}

/// Default digest: SHA-256, standard base64.
pub fn sha256_base64(text: &str) -> String {
    BASE64_STANDARD.encode(Sha256::digest(text.as_bytes()))
}

fn unhashable(err: StructError) -> StructError {
    match err {
        StructError::CircularReference(at) => {
            StructError::Unhashable(format!("circular reference at {}", at))
        }
        StructError::Unhashable(reason) => StructError::Unhashable(reason),
        other => StructError::Unhashable(other.to_string()),
    }
}

// == Content Digest ==
/// Lowercase hex SHA-256 of the kind-preserving serialization.
///
/// Unlike [`hash`], values that `deep_equal` tells apart never share a
/// digest: NaN differs from `null`, a date from its ISO string, an
/// `undefined` entry from a missing one.
///
/// # Errors
/// `StructError::Unhashable` for circular values and for values whose
/// equality is identity (functions, symbols, symbol keys).
pub fn content_digest(value: &Value) -> Result<String> {
    let text = to_tagged_string(value).map_err(unhashable)?;
    Ok(format!("{:x}", Sha256::digest(text.as_bytes())))
}

/// First [`CONTENT_KEY_LENGTH`] hex digits of [`content_digest`], used to key
/// derived-computation caches.
pub fn content_key(value: &Value) -> Result<String> {
    let mut key = content_digest(value)?;
    key.truncate(CONTENT_KEY_LENGTH);
    Ok(key)
}
