// src/core/integrity.rs
//! Plaintext digests, independent of AEAD authentication

use sha2::{Digest, Sha256};

use crate::error::{CoreError, Result};

const FINGERPRINT_CONTEXT: &str = "envelope-vault 2025 wrapped-key fingerprint";

/// Lowercase hex SHA-256 of `data`
pub fn digest(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn verify(data: &[u8], expected: &str) -> bool {
    digest(data).eq_ignore_ascii_case(expected.trim())
}

/// Hard failure unless `data` hashes to `expected`
pub fn ensure(data: &[u8], expected: &str) -> Result<()> {
    if verify(data, expected) {
        Ok(())
    } else {
        Err(CoreError::IntegrityMismatch)
    }
}

/// 16 hex chars identifying a wrapped key in logs without revealing it
pub fn key_fingerprint(wrapped: &[u8]) -> String {
    let derived = blake3::derive_key(FINGERPRINT_CONTEXT, wrapped);
    hex::encode(&derived[..8])
}
