//! SHA-256 digests.

use sha2::{Digest, Sha256};

/// Length of a truncated digest.
pub const TRUNCATED_LEN: usize = 20;

/// Compute the SHA-256 digest of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// The first 20 bytes of the SHA-256 digest.
pub fn sha256_truncated(data: &[u8]) -> [u8; TRUNCATED_LEN] {
    let full = sha256(data);
    let mut output = [0u8; TRUNCATED_LEN];
    output.copy_from_slice(&full[..TRUNCATED_LEN]);
    output
}
