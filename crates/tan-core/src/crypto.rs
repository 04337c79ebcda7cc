// crates/tan-core/src/crypto.rs

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::FarmError;

/// Compute SHA-256 hash of the given bytes.
///
/// Returns a 32-byte hash.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash the canonical JSON encoding of a value.
///
/// Used to key queued timelock transactions: identical calls with the same
/// eta always produce the same hash.
pub fn hash_json<T: Serialize>(value: &T) -> Result<[u8; 32], FarmError> {
    let encoded = serde_json::to_vec(value)?;
    Ok(hash_bytes(&encoded))
}
