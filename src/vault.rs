// src/vault.rs
//! Composition root
//!
//! [`Vault`] owns the database connection, keyring and blob store built from a
//! [`Config`], and hands out short-lived views that borrow them. Nothing here
//! is global; two vaults over different configs coexist in one process.

use std::fmt;

use rusqlite::Connection;
use tracing::info;

use crate::aliases::DbPassphrase;
use crate::audit::AuditSink;
use crate::blob::DirBlobStore;
use crate::config::Config;
use crate::consts::DEFAULT_AUDIT_LIMIT;
use crate::db::audit_db_ops::{list_audit, AuditRecord, SqliteAuditLog};
use crate::db::file_db_ops::{list_files, FileEntry};
use crate::db::vault_db_conn::open_vault_db;
use crate::enums::KeyMode;
use crate::error::{CoreError, Result, ResultExt};
use crate::file_vault::FileVault;
use crate::keys::{KeyManagementService, Keyring, RemoteKeyProvider, SoftKms};
use crate::report::VaultReport;
use crate::rotate_keys::{RotationJob, RotationReport};
use crate::secrets::SecretStore;

pub struct Vault {
    config: Config,
    conn: Connection,
    keyring: Keyring,
    blobs: Option<DirBlobStore>,
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("config", &self.config)
            .field("mode", &self.keyring.default_mode())
            .finish()
    }
}

impl Vault {
    /// Open using the soft KMS from `keys.kms_master_key` when one is configured
    pub fn open(config: Config) -> Result<Self> {
        let kms: Option<Box<dyn KeyManagementService>> = match (
            config.keys.kms_key_id.as_deref(),
            config.keys.kms_master_key.as_deref(),
        ) {
            (Some(key_id), Some(master_hex)) => {
                Some(Box::new(SoftKms::new().with_hex_key(key_id, master_hex)?))
            }
            _ => None,
        };
        Self::open_with_kms(config, kms)
    }

    /// Open with an explicit key-management backend
    pub fn open_with_kms(
        config: Config,
        kms: Option<Box<dyn KeyManagementService>>,
    ) -> Result<Self> {
        config.validate()?;

        let db_key = config.keys.db_key.clone().ok_or_else(|| {
            CoreError::Configuration("database key is not set (keys.db_key / VAULT_DB_KEY)".into())
        })?;
        let db_key = DbPassphrase::new(db_key);

        let remote = match (kms, config.keys.kms_key_id.as_deref()) {
            (Some(kms), Some(key_id)) => Some(RemoteKeyProvider::new(key_id, kms)?),
            _ => None,
        };
        if config.mode == KeyMode::Remote && remote.is_none() {
            return Err(CoreError::Configuration(
                "remote mode needs a key-management backend (keys.kms_master_key or an injected service)"
                    .into(),
            ));
        }
        let keyring = Keyring::new(config.mode, remote);

        let conn = open_vault_db(&config.paths.db, &db_key).context(
            "open",
            &config.paths.db.display().to_string(),
            "open database",
        )?;
        let blobs = config
            .paths
            .blob_dir
            .as_ref()
            .map(DirBlobStore::open)
            .transpose()?;

        info!(mode = %config.mode, db = %config.paths.db.display(), "vault opened");
        Ok(Self {
            config,
            conn,
            keyring,
            blobs,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    pub fn audit_sink(&self) -> SqliteAuditLog<'_> {
        SqliteAuditLog::new(&self.conn)
    }

    pub fn secrets(&self) -> SecretStore<'_> {
        SecretStore::new(&self.conn, &self.keyring)
    }

    pub fn files(&self) -> FileVault<'_> {
        self.files_with_audit(Box::new(self.audit_sink()))
    }

    /// File vault reporting to a caller-chosen audit sink
    pub fn files_with_audit<'a>(&'a self, audit: Box<dyn AuditSink + 'a>) -> FileVault<'a> {
        let mut files = FileVault::new(&self.keyring, audit, &self.config.user_id)
            .with_catalog(&self.conn);
        if let Some(blobs) = &self.blobs {
            files = files.with_blob_store(blobs);
        }
        if let Some(dir) = &self.config.paths.local_dir {
            files = files.with_local_dir(dir);
        }
        files
    }

    pub fn rotation(&self) -> RotationJob<'_> {
        RotationJob::new(
            self.secrets(),
            Box::new(self.audit_sink()),
            &self.config.user_id,
        )
    }

    /// Run a full rotation of all secrets
    pub fn rotate(&self) -> Result<RotationReport> {
        self.rotation().run()
    }

    pub fn list_files(&self) -> Result<Vec<FileEntry>> {
        Ok(list_files(&self.conn, None)?)
    }

    pub fn list_audit(&self, limit: Option<usize>) -> Result<Vec<AuditRecord>> {
        Ok(list_audit(&self.conn, limit.unwrap_or(DEFAULT_AUDIT_LIMIT))?)
    }

    pub fn report(&self) -> Result<VaultReport> {
        VaultReport::collect(&self.conn)
    }
}
