//! Content digests for corruption and tamper detection.
//!
//! The digest is computed over the plaintext at write time and checked after
//! every decryption. A mismatch is always reported, never silently corrected.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compute the SHA-256 digest of a byte payload, lowercase hex encoded.
///
/// Deterministic; doubles as a dedup fingerprint for identical content.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Check a payload against a stored hex digest.
///
/// Comparison runs in constant time over the decoded bytes. A malformed
/// stored digest verifies false rather than panicking.
pub fn verify(bytes: &[u8], stored_digest: &str) -> bool {
    let Ok(expected) = hex::decode(stored_digest) else {
        return false;
    };
    let actual = Sha256::digest(bytes);
    actual.as_slice().ct_eq(&expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        assert_eq!(digest(b"syllabus"), digest(b"syllabus"));
        assert_ne!(digest(b"syllabus"), digest(b"exam"));
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        let d = digest(b"");
        assert_eq!(d.len(), 64);
        // SHA-256 of the empty string is a fixed vector.
        assert_eq!(
            d,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_verify_matches() {
        let data = b"some file content";
        let d = digest(data);
        assert!(verify(data, &d));
    }

    #[test]
    fn test_verify_detects_single_byte_change() {
        let d = digest(b"some file content");
        assert!(!verify(b"some file contenT", &d));
    }

    #[test]
    fn test_verify_malformed_digest_is_false() {
        assert!(!verify(b"data", "zz-not-hex"));
        assert!(!verify(b"data", "abcd")); // wrong length
    }
}
