// src/secrets/mod.rs
//! Named secrets — envelope-encrypted values keyed by `(category, name)`
//!
//! Each value gets its own data key. The row keeps the wrapped key, nonce,
//! ciphertext, plaintext digest and the key mode that produced the wrap.

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::aliases::SecretValue;
use crate::core::crypto::{decrypt, seal};
use crate::core::integrity;
use crate::db::secret_db_ops::{
    delete_secret, find_secret, list_secret_keys, list_secrets, upsert_secret, SecretRecord,
    SecretSummary,
};
use crate::error::{CoreError, Result, ResultExt};
use crate::keys::Keyring;
use crate::rotate_keys::{RotationFailure, RotationReport};

const MAX_LABEL_LEN: usize = 256;

/// Associated data binding a ciphertext to its row
fn record_aad(category: &str, name: &str) -> Vec<u8> {
    let mut aad = Vec::with_capacity(category.len() + 1 + name.len());
    aad.extend_from_slice(category.as_bytes());
    aad.push(0);
    aad.extend_from_slice(name.as_bytes());
    aad
}

fn validate_label(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.len() > MAX_LABEL_LEN || value.contains('\0') {
        return Err(CoreError::InvalidInput(format!(
            "secret {kind} must be 1–{MAX_LABEL_LEN} bytes without NUL"
        )));
    }
    Ok(())
}

pub struct SecretStore<'a> {
    conn: &'a Connection,
    keys: &'a Keyring,
}

impl<'a> SecretStore<'a> {
    pub fn new(conn: &'a Connection, keys: &'a Keyring) -> Self {
        Self { conn, keys }
    }

    /// Encrypt `value` under a fresh data key and upsert it
    pub fn add(&self, category: &str, name: &str, value: &str) -> Result<()> {
        validate_label("category", category)?;
        validate_label("name", name)?;
        let target = format!("{category}/{name}");

        // Dropped (and zeroed) at the end of this scope on every path
        let data_key = self
            .keys
            .generate()
            .context("add", &target, "generate data key")?;

        let (nonce, ciphertext) = seal(
            data_key.plaintext(),
            value.as_bytes(),
            &record_aad(category, name),
        )
        .context("add", &target, "encrypt")?;

        let now = Utc::now();
        let record = SecretRecord {
            category: category.to_string(),
            name: name.to_string(),
            wrapped_key: data_key.wrapped().to_vec(),
            nonce: nonce.to_vec(),
            ciphertext,
            integrity_hash: integrity::digest(value.as_bytes()),
            mode: data_key.mode(),
            created_at: now,
            updated_at: now,
        };
        upsert_secret(self.conn, &record).context("add", &target, "store record")?;

        debug!(%target, mode = %record.mode, key = %data_key.fingerprint(), "secret stored");
        Ok(())
    }

    /// Unwrap with the record's own mode, decrypt, verify digest
    pub fn get(&self, category: &str, name: &str) -> Result<SecretValue> {
        let target = format!("{category}/{name}");
        let record = find_secret(self.conn, category, name)
            .context("get", &target, "load record")?
            .ok_or_else(|| CoreError::NotFound(format!("secret '{target}'")))
            .context("get", &target, "load record")?;

        let data_key = self
            .keys
            .unwrap(&record.wrapped_key, record.mode)
            .context("get", &target, "unwrap data key")?;

        let plaintext = decrypt(
            data_key.plaintext(),
            &record.nonce,
            &record.ciphertext,
            &record_aad(category, name),
        )
        .context("get", &target, "decrypt")?;

        integrity::ensure(plaintext.expose_secret(), &record.integrity_hash)
            .context("get", &target, "verify digest")?;

        let value = std::str::from_utf8(plaintext.expose_secret())
            .map(str::to_owned)
            .map_err(|_| CoreError::MalformedRecord(format!("secret '{target}' is not valid UTF-8")))
            .context("get", &target, "decode value")?;
        Ok(SecretValue::new(value))
    }

    /// Metadata only — nothing is decrypted
    pub fn list(&self, category: Option<&str>) -> Result<Vec<SecretSummary>> {
        Ok(list_secrets(self.conn, category)?)
    }

    /// Idempotent; returns whether a record existed
    pub fn delete(&self, category: &str, name: &str) -> Result<bool> {
        let removed = delete_secret(self.conn, category, name)
            .context("delete", &format!("{category}/{name}"), "remove record")?;
        if removed {
            info!(category, name, "secret deleted");
        }
        Ok(removed)
    }

    /// Re-encrypt every record under a fresh key; returns how many succeeded
    pub fn rotate(&self) -> Result<usize> {
        Ok(self.rotate_all()?.rotated)
    }

    /// Per-record `get` then `add`. A failing record keeps its old row and
    /// the walk moves on.
    pub fn rotate_all(&self) -> Result<RotationReport> {
        let keys = list_secret_keys(self.conn).context("rotate", "secrets", "list records")?;
        let mut report = RotationReport {
            total: keys.len(),
            ..RotationReport::default()
        };

        for (category, name) in keys {
            match self.rotate_one(&category, &name) {
                Ok(()) => report.rotated += 1,
                Err(err) if err.is_not_found() => {
                    // Deleted concurrently — nothing left to rotate
                    report.skipped += 1;
                }
                Err(err) => {
                    warn!(%category, %name, error = %err, "rotation failed — record left unchanged");
                    report.failed.push(RotationFailure {
                        category,
                        name,
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    fn rotate_one(&self, category: &str, name: &str) -> Result<()> {
        let value = self.get(category, name)?;
        self.add(category, name, value.expose_secret())
    }
}
