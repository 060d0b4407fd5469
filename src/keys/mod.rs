// src/keys/mod.rs
//! Key providers — where data keys come from and how they are unwrapped
//!
//! Two strategies implement [`KeyProvider`]:
//! - [`RemoteKeyProvider`] asks a [`KeyManagementService`] to mint and unwrap keys.
//! - [`LocalKeyProvider`] generates keys locally and stores them unwrapped.
//!
//! [`Keyring`] holds both, generates with the configured default, and unwraps
//! with whichever strategy a stored record names.

mod local;
mod remote;
mod soft_kms;

pub use local::LocalKeyProvider;
pub use remote::{KeyManagementService, KmsDataKey, RemoteKeyProvider};
pub use soft_kms::SoftKms;

use tracing::debug;

use crate::core::key::DataKey;
use crate::enums::KeyMode;
use crate::error::{CoreError, Result};

pub trait KeyProvider: Send + Sync {
    fn mode(&self) -> KeyMode;

    /// Fresh data key: plaintext for immediate use, wrapped form for storage
    fn generate_data_key(&self) -> Result<DataKey>;

    /// Recover the plaintext key from its wrapped form
    fn unwrap_data_key(&self, wrapped: &[u8]) -> Result<DataKey>;
}

/// Strategy dispatch for generation (configured mode) and unwrap (stored mode)
pub struct Keyring {
    default_mode: KeyMode,
    local: LocalKeyProvider,
    remote: Option<RemoteKeyProvider>,
}

impl Keyring {
    pub fn new(default_mode: KeyMode, remote: Option<RemoteKeyProvider>) -> Self {
        Self {
            default_mode,
            local: LocalKeyProvider,
            remote,
        }
    }

    /// Keyring that can only serve local mode
    pub fn local_only() -> Self {
        Self::new(KeyMode::Local, None)
    }

    pub fn default_mode(&self) -> KeyMode {
        self.default_mode
    }

    pub fn provider(&self, mode: KeyMode) -> Result<&dyn KeyProvider> {
        match mode {
            KeyMode::Local => Ok(&self.local),
            KeyMode::Remote => self
                .remote
                .as_ref()
                .map(|p| p as &dyn KeyProvider)
                .ok_or_else(|| {
                    CoreError::Configuration(
                        "remote key provider is not configured (missing key-management backend or key id)"
                            .into(),
                    )
                }),
        }
    }

    pub fn generate(&self) -> Result<DataKey> {
        let key = self.provider(self.default_mode)?.generate_data_key()?;
        debug!(mode = %key.mode(), key = %key.fingerprint(), "generated data key");
        Ok(key)
    }

    pub fn unwrap(&self, wrapped: &[u8], mode: KeyMode) -> Result<DataKey> {
        self.provider(mode)?.unwrap_data_key(wrapped)
    }
}
