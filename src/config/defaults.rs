// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{Keys, Paths};

pub const DEFAULT_USER_ID: &str = "anonymous";
pub const DEFAULT_DB_FILE: &str = "vault.db";
const APP_DIR: &str = "envelope-vault";

pub fn default_user_id() -> String {
    DEFAULT_USER_ID.into()
}

/// `<data_local_dir>/envelope-vault/vault.db`, or `./vault.db` when the platform has no data dir
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR).join(DEFAULT_DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
}

pub fn default_keys() -> Keys {
    Keys {
        kms_key_id: None,
        db_key: None,
        kms_master_key: None,
    }
}

pub fn default_paths() -> Paths {
    Paths {
        db: default_db_path(),
        blob_dir: None,
        local_dir: None,
    }
}
