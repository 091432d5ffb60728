//! Deterministic output fingerprints
//!
//! Formatter results are compared across runs and processes, so the hash is
//! blake3 rather than `std`'s randomly seeded `Hasher`.

/// Fingerprint of a formatter output.
///
/// Takes the first 8 bytes of the blake3 hash as a little-endian u64.
#[inline]
pub fn fingerprint(markup: &str) -> u64 {
    let hash = blake3::hash(markup.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
