// src/config/app.rs
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::defaults::*;
use crate::consts::DEFAULT_CONFIG_FILE;
use crate::enums::KeyMode;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Key-provider strategy used for newly written secrets and uploads
    #[serde(default)]
    pub mode: KeyMode,
    /// Recorded as uploader in blob metadata and as audit actor
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_keys")]
    pub keys: Keys,
    #[serde(default = "default_paths")]
    pub paths: Paths,
}

#[derive(Clone, Deserialize, Default)]
pub struct Keys {
    /// Key-management key identifier used in remote mode
    #[serde(default)]
    pub kms_key_id: Option<String>,
    /// SQLCipher passphrase for the record database
    #[serde(default)]
    pub db_key: Option<String>,
    /// Hex master key for the in-process soft KMS
    #[serde(default)]
    pub kms_master_key: Option<String>,
}

// Never print key material, only whether it is set
impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Keys")
            .field("kms_key_id", &self.kms_key_id)
            .field("db_key", &redact(&self.db_key))
            .field("kms_master_key", &redact(&self.kms_master_key))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    #[serde(default = "default_db_path")]
    pub db: PathBuf,
    /// Root of the directory-backed blob store (remote-mode file envelopes)
    #[serde(default)]
    pub blob_dir: Option<PathBuf>,
    /// Destination of local-mode plain file copies
    #[serde(default)]
    pub local_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: KeyMode::default(),
            user_id: default_user_id(),
            keys: default_keys(),
            paths: default_paths(),
        }
    }
}

impl Config {
    /// Load from `$VAULT_CONFIG` (or `vault.toml`), apply env overrides, validate
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("VAULT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(config_path)
    }

    pub fn load_from<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        let mut conf = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_toml_str(&content)?
        } else {
            debug!(path = %config_path.display(), "config file not found — using built-in defaults");
            Config::default()
        };

        conf.apply_overrides(|name| std::env::var(name).ok())?;
        conf.validate()?;
        Ok(conf)
    }

    /// Parse without env overrides or validation
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `VAULT_*` variables resolved through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(mode) = get("VAULT_MODE") {
            self.mode = mode.parse()?;
        }
        if let Some(user) = get("VAULT_USER_ID") {
            self.user_id = user;
        }
        if let Some(key_id) = get("VAULT_KMS_KEY") {
            self.keys.kms_key_id = Some(key_id);
        }
        if let Some(db_key) = get("VAULT_DB_KEY") {
            self.keys.db_key = Some(db_key);
        }
        if let Some(master) = get("VAULT_KMS_MASTER_KEY") {
            self.keys.kms_master_key = Some(master);
        }
        if let Some(db) = get("VAULT_DB_PATH") {
            self.paths.db = PathBuf::from(db);
        }
        if let Some(blob_dir) = get("VAULT_BLOB_PATH") {
            self.paths.blob_dir = Some(PathBuf::from(blob_dir));
        }
        if let Some(local_dir) = get("VAULT_REMOTE_PATH") {
            self.paths.local_dir = Some(PathBuf::from(local_dir));
        }
        Ok(())
    }

    /// Reject configurations that cannot serve the selected mode
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            KeyMode::Remote => {
                if self.keys.kms_key_id.is_none() || self.paths.blob_dir.is_none() {
                    return Err(CoreError::Configuration(
                        "remote mode requires keys.kms_key_id (VAULT_KMS_KEY) and paths.blob_dir (VAULT_BLOB_PATH)"
                            .into(),
                    ));
                }
            }
            KeyMode::Local => {
                if self.paths.local_dir.is_none() {
                    return Err(CoreError::Configuration(
                        "local mode requires paths.local_dir (VAULT_REMOTE_PATH)".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}
