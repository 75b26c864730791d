//! Symmetric encryption using AES-256-CBC with PKCS#7 padding.
//!
//! Every encrypt call draws a fresh random 16-byte IV, so identical
//! plaintexts never produce identical ciphertexts under the same key. CBC
//! carries no authentication tag; tampering is caught either here (invalid
//! padding) or by the content digest checked after decryption. Timing
//! characteristics of the padding check are an accepted residual risk of the
//! primitive, not solved here.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;

use crate::keys::{Iv, ScopedKey};
use classvault_common::{Error, Result};

/// AES block size in bytes. Numerically equal to the IV length, but the
/// alignment check below is about cipher blocks, not IVs.
pub const BLOCK_LENGTH: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encrypt plaintext under a scoped key.
///
/// # Postconditions
/// - Returns the freshly generated IV and the ciphertext
/// - Ciphertext length is the plaintext length rounded up to the next
///   16-byte block boundary (always at least one block)
pub fn encrypt(key: &ScopedKey, plaintext: &[u8]) -> (Iv, Vec<u8>) {
    let iv = Iv::generate();
    let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), iv.as_bytes().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    (iv, ciphertext)
}

/// Decrypt ciphertext under a scoped key and IV.
///
/// # Errors
/// - `Error::Integrity` if the ciphertext is empty, not block-aligned, or
///   unpads to invalid padding (wrong key, corrupted ciphertext, or a
///   mismatched IV)
pub fn decrypt(key: &ScopedKey, iv: &Iv, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LENGTH != 0 {
        return Err(Error::Integrity(
            "Ciphertext is not block-aligned".to_string(),
        ));
    }

    Aes256CbcDec::new(key.as_bytes().into(), iv.as_bytes().into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| Error::Integrity("Decryption failed: invalid padding".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity;
    use crate::keys::KEY_LENGTH;
    use proptest::prelude::*;

    fn test_key(byte: u8) -> ScopedKey {
        ScopedKey::from_bytes([byte; KEY_LENGTH])
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key(42);
        let plaintext = b"Hello, encrypted classroom!";

        let (iv, ciphertext) = encrypt(&key, plaintext);
        let decrypted = decrypt(&key, &iv, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let key = test_key(42);
        let (iv, ciphertext) = encrypt(&key, b"");

        // PKCS#7 pads the empty message to one full block.
        assert_eq!(ciphertext.len(), BLOCK_LENGTH);
        assert_eq!(decrypt(&key, &iv, &ciphertext).unwrap(), b"");
    }

    #[test]
    fn test_iv_unique_across_many_calls() {
        let key = test_key(42);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..1000 {
            let (iv, _) = encrypt(&key, b"same plaintext");
            assert!(seen.insert(iv.to_hex()), "IV collision");
        }
    }

    #[test]
    fn test_same_plaintext_different_ciphertext() {
        let key = test_key(42);
        let (_, ct1) = encrypt(&key, b"same plaintext");
        let (_, ct2) = encrypt(&key, b"same plaintext");
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let key = test_key(42);
        let (iv, ciphertext) = encrypt(&key, b"some data worth protecting");

        assert!(decrypt(&key, &iv, &ciphertext[..ciphertext.len() - 1]).is_err());
        assert!(decrypt(&key, &iv, b"").is_err());
    }

    // CBC has no authentication tag, so a flipped byte must either break the
    // padding or surface as a digest mismatch. Silent undetected corruption
    // must not occur.
    #[test]
    fn test_tampering_never_goes_undetected() {
        let key = test_key(42);
        let plaintext = b"important data that must not corrupt silently";
        let expected = integrity::digest(plaintext);

        let (iv, ciphertext) = encrypt(&key, plaintext);

        for pos in 0..ciphertext.len() {
            let mut tampered = ciphertext.clone();
            tampered[pos] ^= 0xFF;

            match decrypt(&key, &iv, &tampered) {
                Err(_) => {}
                Ok(bytes) => assert!(
                    !integrity::verify(&bytes, &expected),
                    "tampered byte {} produced plaintext passing verification",
                    pos
                ),
            }
        }
    }

    #[test]
    fn test_wrong_key_never_goes_undetected() {
        let plaintext = b"secret data";
        let expected = integrity::digest(plaintext);

        let (iv, ciphertext) = encrypt(&test_key(1), plaintext);

        match decrypt(&test_key(2), &iv, &ciphertext) {
            Err(_) => {}
            Ok(bytes) => assert!(!integrity::verify(&bytes, &expected)),
        }
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_payloads(
            data in proptest::collection::vec(any::<u8>(), 0..2048),
            key_byte in any::<u8>(),
        ) {
            let key = test_key(key_byte);
            let (iv, ciphertext) = encrypt(&key, &data);
            prop_assert_eq!(ciphertext.len() % BLOCK_LENGTH, 0);
            let decrypted = decrypt(&key, &iv, &ciphertext).unwrap();
            prop_assert_eq!(decrypted, data);
        }
    }
}
