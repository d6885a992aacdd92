//! API key secret generation and hashing.
//!
//! The raw secret is shown to the caller exactly once at creation time;
//! only its SHA-256 hash is ever persisted, and lookups go through the
//! same hash.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Prefix identifying QuoteDesk API keys in logs and headers.
pub const API_KEY_PREFIX: &str = "qd_";

/// Number of random bytes backing a secret.
const SECRET_BYTES: usize = 32;

/// Generates a new high-entropy API key secret.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
}

/// One-way hash of an API key secret, used for storage and lookup.
pub fn hash_api_key(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
