// src/keys/remote.rs
//! Remote strategy: data keys minted and unwrapped by a key-management service

use zeroize::Zeroizing;

use crate::core::key::DataKey;
use crate::enums::KeyMode;
use crate::error::{CoreError, Result};
use crate::keys::KeyProvider;

/// Response of [`KeyManagementService::generate_data_key`]
pub struct KmsDataKey {
    pub plaintext: Zeroizing<Vec<u8>>,
    pub wrapped: Vec<u8>,
}

/// Backend contract; errors surface as [`CoreError::KeyProvider`] and are never retried here
pub trait KeyManagementService: Send + Sync {
    fn generate_data_key(&self, key_id: &str) -> Result<KmsDataKey>;
    fn decrypt(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

pub struct RemoteKeyProvider {
    key_id: String,
    kms: Box<dyn KeyManagementService>,
}

impl RemoteKeyProvider {
    pub fn new(key_id: impl Into<String>, kms: Box<dyn KeyManagementService>) -> Result<Self> {
        let key_id = key_id.into();
        if key_id.trim().is_empty() {
            return Err(CoreError::Configuration(
                "remote key provider needs a key identifier".into(),
            ));
        }
        Ok(Self { key_id, kms })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl KeyProvider for RemoteKeyProvider {
    fn mode(&self) -> KeyMode {
        KeyMode::Remote
    }

    fn generate_data_key(&self) -> Result<DataKey> {
        let KmsDataKey { plaintext, wrapped } = self.kms.generate_data_key(&self.key_id)?;
        DataKey::from_slice(&plaintext, wrapped, KeyMode::Remote)
    }

    fn unwrap_data_key(&self, wrapped: &[u8]) -> Result<DataKey> {
        let plaintext = self.kms.decrypt(wrapped)?;
        DataKey::from_slice(&plaintext, wrapped.to_vec(), KeyMode::Remote)
    }
}

impl<T: KeyManagementService + ?Sized> KeyManagementService for std::sync::Arc<T> {
    fn generate_data_key(&self, key_id: &str) -> Result<KmsDataKey> {
        (**self).generate_data_key(key_id)
    }

    fn decrypt(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        (**self).decrypt(wrapped)
    }
}
