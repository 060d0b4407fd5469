// tests/support.rs
//! Test utilities — isolated vaults in either key mode

use std::path::{Path, PathBuf};
use std::sync::Arc;

use envelope_vault::{Config, CoreResult, KeyMode, SoftKms, Vault};
use rusqlite::params;
use tempfile::TempDir;

pub const KMS_KEY_ID: &str = "alias/test-vault";
pub const DB_KEY: &str = "test-vault-secret-2025";

/// Config with every path set, so it validates in both modes
pub fn test_config(dir: &Path, mode: KeyMode) -> Config {
    let mut config = Config::default();
    config.mode = mode;
    config.user_id = "tester".into();
    config.keys.kms_key_id = Some(KMS_KEY_ID.into());
    config.keys.db_key = Some(DB_KEY.into());
    config.paths.db = dir.join("vault.db");
    config.paths.blob_dir = Some(dir.join("blobs"));
    config.paths.local_dir = Some(dir.join("local"));
    config
}

pub struct TestVault {
    pub vault: Vault,
    pub kms: Arc<SoftKms>,
    dir: TempDir,
}

#[allow(dead_code)] // Not every test binary uses every helper
impl TestVault {
    pub fn new(mode: KeyMode) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let kms = Arc::new(SoftKms::new().with_random_key(KMS_KEY_ID));
        let vault = open(dir.path(), mode, &kms);
        Self { vault, kms, dir }
    }

    /// Second handle on the same database, blobs and key service
    pub fn reopen(&self, mode: KeyMode) -> Vault {
        open(self.dir.path(), mode, &self.kms)
    }

    /// Same database, but no key-management backend at all
    pub fn reopen_without_kms(&self, mode: KeyMode) -> CoreResult<Vault> {
        Vault::open_with_kms(test_config(self.dir.path(), mode), None)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.dir.path().join("blobs")
    }

    pub fn local_dir(&self) -> PathBuf {
        self.dir.path().join("local")
    }

    /// Write `contents` to a fresh plaintext file under the temp dir
    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let src = self.dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        let path = src.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Raw `(wrapped_key, nonce, ciphertext, mode)` of a stored secret
    pub fn raw_secret(&self, category: &str, name: &str) -> (Vec<u8>, Vec<u8>, Vec<u8>, String) {
        self.vault
            .connection()
            .query_row(
                "SELECT wrapped_key, nonce, ciphertext, mode FROM secrets
                 WHERE category = ?1 AND name = ?2",
                params![category, name],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap()
    }

    pub fn secret_rows(&self) -> i64 {
        self.vault
            .connection()
            .query_row("SELECT COUNT(*) FROM secrets", [], |r| r.get(0))
            .unwrap()
    }
}

fn open(dir: &Path, mode: KeyMode, kms: &Arc<SoftKms>) -> Vault {
    Vault::open_with_kms(test_config(dir, mode), Some(Box::new(Arc::clone(kms)))).unwrap()
}
