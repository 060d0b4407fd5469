// src/core/crypto.rs
//! Pure cryptographic primitives — no I/O, no database
//!
//! AES-256-GCM over in-memory buffers. Every encryption draws a fresh random
//! nonce; callers never supply one for sealing, so nonce reuse under a key is
//! not expressible through [`seal`] / [`seal_prefixed`].

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::RngCore;

use crate::aliases::PlainBytes;
use crate::consts::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{CoreError, Result};

fn cipher(key: &[u8; KEY_SIZE]) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key))
}

/// Fresh random 96-bit nonce
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}

/// Encrypt under an explicit nonce → ciphertext with appended tag
pub fn encrypt(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    cipher(key)
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CoreError::MalformedRecord("plaintext too large for AES-GCM".into()))
}

/// Decrypt and authenticate; a tag mismatch never yields any plaintext
pub fn decrypt(
    key: &[u8; KEY_SIZE],
    nonce: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<PlainBytes> {
    if nonce.len() != NONCE_SIZE {
        return Err(CoreError::MalformedRecord(format!(
            "nonce is {} bytes, expected {NONCE_SIZE}",
            nonce.len()
        )));
    }
    if ciphertext.len() < TAG_SIZE {
        return Err(CoreError::MalformedRecord(
            "ciphertext shorter than authentication tag".into(),
        ));
    }
    let plaintext = cipher(key)
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CoreError::Authentication)?;
    Ok(PlainBytes::new(plaintext))
}

/// Encrypt under a fresh nonce → (nonce, ciphertext)
pub fn seal(
    key: &[u8; KEY_SIZE],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<([u8; NONCE_SIZE], Vec<u8>)> {
    let nonce = generate_nonce();
    let ciphertext = encrypt(key, &nonce, plaintext, aad)?;
    Ok((nonce, ciphertext))
}

/// Single-blob layout: `nonce || ciphertext || tag`
pub fn seal_prefixed(key: &[u8; KEY_SIZE], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let (nonce, ciphertext) = seal(key, plaintext, aad)?;
    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Inverse of [`seal_prefixed`]
pub fn open_prefixed(key: &[u8; KEY_SIZE], blob: &[u8], aad: &[u8]) -> Result<PlainBytes> {
    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CoreError::MalformedRecord(format!(
            "envelope is {} bytes, shorter than nonce + tag",
            blob.len()
        )));
    }
    let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
    decrypt(key, nonce, ciphertext, aad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::key::generate_key;

    #[test]
    fn test_round_trip_encrypt_decrypt() {
        let key = generate_key();
        let (nonce, ct) = seal(key.expose_secret(), b"hello, secret world!", b"db\0pw").unwrap();
        let pt = decrypt(key.expose_secret(), &nonce, &ct, b"db\0pw").unwrap();
        assert_eq!(pt.expose_secret().as_slice(), b"hello, secret world!");
    }

    #[test]
    fn test_same_plaintext_twice_gives_different_ciphertext() {
        let key = generate_key();
        let a = seal_prefixed(key.expose_secret(), b"same plaintext", b"").unwrap();
        let b = seal_prefixed(key.expose_secret(), b"same plaintext", b"").unwrap();
        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_ciphertext_fails_authentication() {
        let key = generate_key();
        let mut blob = seal_prefixed(key.expose_secret(), b"important", b"").unwrap();
        blob[NONCE_SIZE + 1] ^= 0xff;
        let result = open_prefixed(key.expose_secret(), &blob, b"");
        assert!(matches!(result, Err(CoreError::Authentication)));
    }

    #[test]
    fn test_wrong_associated_data_fails_authentication() {
        let key = generate_key();
        let blob = seal_prefixed(key.expose_secret(), b"bound", b"file-a").unwrap();
        let result = open_prefixed(key.expose_secret(), &blob, b"file-b");
        assert!(matches!(result, Err(CoreError::Authentication)));
    }

    #[test]
    fn test_short_envelope_is_malformed() {
        let key = generate_key();
        let result = open_prefixed(key.expose_secret(), &[0u8; 8], b"");
        assert!(matches!(result, Err(CoreError::MalformedRecord(_))));
    }

    #[test]
    fn test_empty_plaintext_works() {
        let key = generate_key();
        let blob = seal_prefixed(key.expose_secret(), b"", b"").unwrap();
        assert_eq!(blob.len(), NONCE_SIZE + TAG_SIZE);
        let pt = open_prefixed(key.expose_secret(), &blob, b"").unwrap();
        assert!(pt.expose_secret().is_empty());
    }
}
