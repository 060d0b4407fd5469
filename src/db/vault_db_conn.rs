// src/db/vault_db_conn.rs
use std::{fs, path::Path};

use rusqlite::{Connection, Result};

use crate::aliases::DbPassphrase;
use crate::consts::DB_KDF_ITERATIONS;

/// Open (creating if needed) the encrypted record database and ensure the schema
pub fn open_vault_db<P: AsRef<Path>>(db_path: P, key: &DbPassphrase) -> Result<Connection> {
    let db_path = db_path.as_ref();
    if let Some(parent) = db_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let conn = Connection::open(db_path)?;

    // PRAGMA does not take bound parameters; quote the literal instead
    let escaped = key.expose_secret().replace('\'', "''");
    conn.execute_batch(&format!("PRAGMA key = '{escaped}';"))?;
    conn.execute_batch(&format!(
        r#"
        PRAGMA cipher_page_size = 4096;
        PRAGMA kdf_iter = {DB_KDF_ITERATIONS};
        PRAGMA cipher_hmac_algorithm = HMAC_SHA512;
        PRAGMA cipher_kdf_algorithm = PBKDF2_HMAC_SHA512;
        PRAGMA cipher_plaintext_header_size = 0;
        "#
    ))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS secrets (
            category       TEXT NOT NULL,
            name           TEXT NOT NULL,
            wrapped_key    BLOB NOT NULL,
            nonce          BLOB NOT NULL,
            ciphertext     BLOB NOT NULL,
            mode           TEXT NOT NULL,
            integrity_hash TEXT NOT NULL,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL,
            PRIMARY KEY (category, name)
        );

        CREATE TABLE IF NOT EXISTS files (
            filename    TEXT PRIMARY KEY,
            uploaded_at TEXT NOT NULL,
            hash        TEXT,
            size        INTEGER NOT NULL,
            location    TEXT NOT NULL,
            mode        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS audit (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            action   TEXT NOT NULL,
            subject  TEXT NOT NULL,
            target   TEXT NOT NULL,
            location TEXT NOT NULL,
            success  INTEGER NOT NULL,
            error    TEXT,
            ts       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_files_uploaded_at ON files(uploaded_at);
        CREATE INDEX IF NOT EXISTS idx_audit_ts ON audit(ts);
        "#,
    )?;

    Ok(conn)
}
