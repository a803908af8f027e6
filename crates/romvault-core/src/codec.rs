//! Transport encoding for save payloads.
//!
//! Payloads travel inside JSON bodies as standard, padded base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::Result;

/// Encode a payload for transport.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a transport payload.
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded)?)
}
