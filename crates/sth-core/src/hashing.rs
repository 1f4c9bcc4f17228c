//! Truncated SHA-512 digests used as collection bodies when hashing is on.

use sha2::{Digest, Sha512};

/// Length of a full hex-encoded SHA-512 digest.
pub const FULL_HASH_LEN: usize = 128;

/// Lowercase hex SHA-512 of `input`, truncated to `limit` characters.
///
/// A limit above [`FULL_HASH_LEN`] (or `None`) yields the full digest.
#[must_use]
pub fn generate_hash(input: &str, limit: Option<usize>) -> String {
    let mut hash = hex::encode(Sha512::digest(input.as_bytes()));
    if let Some(limit) = limit {
        hash.truncate(limit);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_digest_is_hex() {
        let hash = generate_hash("/room1", None);
        assert_eq!(hash.len(), FULL_HASH_LEN);
        assert!(hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn known_digest_prefix() {
        // sha512("abc")
        assert_eq!(generate_hash("abc", Some(16)), "ddaf35a193617aba");
    }

    #[test]
    fn truncation_is_a_prefix() {
        let full = generate_hash("sth_/room1_Room", None);
        let short = generate_hash("sth_/room1_Room", Some(20));
        assert_eq!(short.len(), 20);
        assert!(full.starts_with(&short));
        assert_eq!(generate_hash("a", Some(500)).len(), FULL_HASH_LEN);
    }

    #[test]
    fn deterministic() {
        assert_eq!(generate_hash("a", Some(40)), generate_hash("a", Some(40)));
        assert_ne!(generate_hash("a", Some(40)), generate_hash("b", Some(40)));
    }
}
