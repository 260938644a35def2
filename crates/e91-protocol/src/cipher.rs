//! One-time-pad XOR.

use crate::error::{ProtocolError, ProtocolResult};

/// XOR `data` with `key` byte by byte.
///
/// Encryption and decryption are the same operation. Fails when the two
/// inputs differ in length.
pub fn xor_bytes(data: &[u8], key: &[u8]) -> ProtocolResult<Vec<u8>> {
    if data.len() != key.len() {
        return Err(ProtocolError::LengthMismatch {
            what: "payload bytes vs. key bytes",
            left: data.len(),
            right: key.len(),
        });
    }
    Ok(data.iter().zip(key).map(|(d, k)| d ^ k).collect())
}
