// src/core/key.rs
//! Data-key handle
//!
//! A [`DataKey`] is the only place a plaintext data key lives. It is owned by
//! the operation that created it and zeroed when dropped, whichever way that
//! operation exits.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

use crate::aliases::{DataKey32, RandomDataKey32, SecureRandomExt};
use crate::consts::KEY_SIZE;
use crate::core::integrity::key_fingerprint;
use crate::enums::KeyMode;
use crate::error::{CoreError, Result};

/// Generate a new random 256-bit data key
#[inline]
pub fn generate_key() -> DataKey32 {
    DataKey32::new(**RandomDataKey32::new())
}

/// Plaintext data key plus its storage-safe wrapped form
pub struct DataKey {
    plaintext: DataKey32,
    wrapped: Vec<u8>,
    mode: KeyMode,
}

impl DataKey {
    pub fn new(plaintext: DataKey32, wrapped: Vec<u8>, mode: KeyMode) -> Self {
        Self {
            plaintext,
            wrapped,
            mode,
        }
    }

    /// Build from an untrusted plaintext buffer (e.g. a key service response)
    pub fn from_slice(plaintext: &[u8], wrapped: Vec<u8>, mode: KeyMode) -> Result<Self> {
        let bytes: Zeroizing<[u8; KEY_SIZE]> =
            Zeroizing::new(plaintext.try_into().map_err(|_| {
                CoreError::KeyProvider(format!(
                    "{mode} backend returned a {}-byte data key, expected {KEY_SIZE}",
                    plaintext.len()
                ))
            })?);
        Ok(Self::new(DataKey32::new(*bytes), wrapped, mode))
    }

    pub fn plaintext(&self) -> &[u8; KEY_SIZE] {
        self.plaintext.expose_secret()
    }

    pub fn wrapped(&self) -> &[u8] {
        &self.wrapped
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Short non-secret identifier of the wrapped key, safe for logs
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.wrapped)
    }
}

// In local mode the wrapped form *is* the key
impl Drop for DataKey {
    fn drop(&mut self) {
        self.wrapped.zeroize();
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKey")
            .field("plaintext", &"[REDACTED]")
            .field("wrapped", &self.fingerprint())
            .field("mode", &self.mode)
            .finish()
    }
}
