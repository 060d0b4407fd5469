// src/keys/local.rs
//! Local strategy: no key service, the "wrapped" key is the raw key
//!
//! This trades away key wrapping so the vault works with no external
//! dependency. Anyone who can read a local-mode record can decrypt it.

use crate::consts::KEY_SIZE;
use crate::core::key::{generate_key, DataKey};
use crate::enums::KeyMode;
use crate::error::{CoreError, Result};
use crate::keys::KeyProvider;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalKeyProvider;

impl KeyProvider for LocalKeyProvider {
    fn mode(&self) -> KeyMode {
        KeyMode::Local
    }

    fn generate_data_key(&self) -> Result<DataKey> {
        let plaintext = generate_key();
        let wrapped = plaintext.expose_secret().to_vec();
        Ok(DataKey::new(plaintext, wrapped, KeyMode::Local))
    }

    fn unwrap_data_key(&self, wrapped: &[u8]) -> Result<DataKey> {
        // Anything but a bare 32-byte key was not produced here
        if wrapped.len() != KEY_SIZE {
            return Err(CoreError::KeyProvider(format!(
                "local unwrap: wrapped key is {} bytes, expected a raw {KEY_SIZE}-byte key",
                wrapped.len()
            )));
        }
        DataKey::from_slice(wrapped, wrapped.to_vec(), KeyMode::Local)
    }
}
