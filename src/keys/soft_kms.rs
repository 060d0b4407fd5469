// src/keys/soft_kms.rs
//! In-process key-management service
//!
//! Holds named 256-bit master keys and wraps data keys with AES-256-GCM.
//! Wrapped layout: `[id_len:u8][key_id][nonce:12][ciphertext+tag]`, with the
//! key id as associated data so a blob cannot be replayed under another id.

use std::collections::HashMap;
use std::fmt;

use zeroize::Zeroizing;

use crate::aliases::MasterKey32;
use crate::consts::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::core::crypto::{open_prefixed, seal_prefixed};
use crate::core::key::generate_key;
use crate::error::{CoreError, Result};
use crate::keys::{KeyManagementService, KmsDataKey};

#[derive(Default)]
pub struct SoftKms {
    keys: HashMap<String, MasterKey32>,
}

impl SoftKms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key_id: impl Into<String>, master: MasterKey32) -> Self {
        self.keys.insert(key_id.into(), master);
        self
    }

    /// Register a fresh random master key under `key_id`
    pub fn with_random_key(self, key_id: impl Into<String>) -> Self {
        let master = generate_key();
        self.with_key(key_id, MasterKey32::new(*master.expose_secret()))
    }

    /// Register a master key given as 64 hex characters
    pub fn with_hex_key(self, key_id: impl Into<String>, master_hex: &str) -> Result<Self> {
        let raw = Zeroizing::new(hex::decode(master_hex.trim()).map_err(|_| {
            CoreError::Configuration("soft KMS master key is not valid hex".into())
        })?);
        let bytes: Zeroizing<[u8; KEY_SIZE]> =
            Zeroizing::new(raw.as_slice().try_into().map_err(|_| {
                CoreError::Configuration(format!(
                    "soft KMS master key must be {KEY_SIZE} bytes, got {}",
                    raw.len()
                ))
            })?);
        Ok(self.with_key(key_id, MasterKey32::new(*bytes)))
    }

    fn master(&self, key_id: &str) -> Result<&MasterKey32> {
        self.keys
            .get(key_id)
            .ok_or_else(|| CoreError::KeyProvider(format!("unknown key id '{key_id}'")))
    }
}

impl fmt::Debug for SoftKms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.keys.keys().collect();
        ids.sort();
        f.debug_struct("SoftKms").field("key_ids", &ids).finish()
    }
}

impl KeyManagementService for SoftKms {
    fn generate_data_key(&self, key_id: &str) -> Result<KmsDataKey> {
        let master = self.master(key_id)?;
        let id_len = u8::try_from(key_id.len()).map_err(|_| {
            CoreError::KeyProvider("key id longer than 255 bytes".into())
        })?;

        let dek = generate_key();
        let sealed = seal_prefixed(master.expose_secret(), dek.expose_secret(), key_id.as_bytes())?;

        let mut wrapped = Vec::with_capacity(1 + key_id.len() + sealed.len());
        wrapped.push(id_len);
        wrapped.extend_from_slice(key_id.as_bytes());
        wrapped.extend_from_slice(&sealed);

        Ok(KmsDataKey {
            plaintext: Zeroizing::new(dek.expose_secret().to_vec()),
            wrapped,
        })
    }

    fn decrypt(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let (&id_len, rest) = wrapped
            .split_first()
            .ok_or_else(|| CoreError::KeyProvider("empty wrapped key".into()))?;
        let id_len = id_len as usize;
        if rest.len() < id_len + NONCE_SIZE + TAG_SIZE {
            return Err(CoreError::KeyProvider(
                "wrapped key too short for this key service".into(),
            ));
        }
        let (id, sealed) = rest.split_at(id_len);
        let key_id = std::str::from_utf8(id)
            .map_err(|_| CoreError::KeyProvider("wrapped key has an invalid key id".into()))?;

        let master = self.master(key_id)?;
        let plaintext = open_prefixed(master.expose_secret(), sealed, id).map_err(|_| {
            CoreError::KeyProvider(format!("key service rejected wrapped key for '{key_id}'"))
        })?;
        Ok(Zeroizing::new(plaintext.expose_secret().clone()))
    }
}
