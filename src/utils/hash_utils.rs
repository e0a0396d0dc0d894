use anyhow::{Context, Result};
use log::trace;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 of a string as lowercase hex
pub fn hash_string(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of the compact JSON form of `value`
pub fn hash_serialized<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).context("Failed to serialize value for hashing")?;
    trace!("Hashing {} byte(s) of JSON", json.len());
    Ok(hash_string(&json))
}
