//! Payload fingerprinting to skip re-normalizing unchanged responses.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 of the payload's compact JSON encoding, hex encoded.
///
/// Object keys keep the order they were received in, so two payloads that
/// differ only in grouping order get different fingerprints.
pub fn payload_fingerprint(payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
