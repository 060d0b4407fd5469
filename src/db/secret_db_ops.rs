// src/db/secret_db_ops.rs
//! Secret-record persistence: upsert by `(category, name)`, lookup, listing, delete
//!
//! Rows are opaque here — nothing in this module encrypts or decrypts.

use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use zeroize::Zeroize;

use crate::enums::KeyMode;

/// One stored secret, exactly as persisted
#[derive(Clone)]
pub struct SecretRecord {
    pub category: String,
    pub name: String,
    pub wrapped_key: Vec<u8>,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub integrity_hash: String,
    pub mode: KeyMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Local-mode wrapped keys are raw keys
impl Drop for SecretRecord {
    fn drop(&mut self) {
        self.wrapped_key.zeroize();
    }
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("category", &self.category)
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("ciphertext_len", &self.ciphertext.len())
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Metadata-only view returned by listings — never carries key or ciphertext
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretSummary {
    pub category: String,
    pub name: String,
    pub mode: KeyMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert or replace in place; `created_at` of an existing row is kept
pub fn upsert_secret(conn: &Connection, record: &SecretRecord) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO secrets (
            category, name, wrapped_key, nonce, ciphertext,
            mode, integrity_hash, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(category, name) DO UPDATE SET
            wrapped_key    = excluded.wrapped_key,
            nonce          = excluded.nonce,
            ciphertext     = excluded.ciphertext,
            mode           = excluded.mode,
            integrity_hash = excluded.integrity_hash,
            updated_at     = excluded.updated_at
        "#,
        params![
            &record.category,
            &record.name,
            &record.wrapped_key,
            &record.nonce,
            &record.ciphertext,
            record.mode,
            &record.integrity_hash,
            record.created_at,
            record.updated_at,
        ],
    )?;
    Ok(())
}

pub fn find_secret(
    conn: &Connection,
    category: &str,
    name: &str,
) -> rusqlite::Result<Option<SecretRecord>> {
    conn.query_row(
        r#"
        SELECT category, name, wrapped_key, nonce, ciphertext,
               mode, integrity_hash, created_at, updated_at
        FROM secrets WHERE category = ?1 AND name = ?2
        "#,
        params![category, name],
        |row| {
            Ok(SecretRecord {
                category: row.get(0)?,
                name: row.get(1)?,
                wrapped_key: row.get(2)?,
                nonce: row.get(3)?,
                ciphertext: row.get(4)?,
                mode: row.get(5)?,
                integrity_hash: row.get(6)?,
                created_at: row.get(7)?,
                updated_at: row.get(8)?,
            })
        },
    )
    .optional()
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<SecretSummary> {
    Ok(SecretSummary {
        category: row.get(0)?,
        name: row.get(1)?,
        mode: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Ordered by category, then name
pub fn list_secrets(
    conn: &Connection,
    category: Option<&str>,
) -> rusqlite::Result<Vec<SecretSummary>> {
    let mut out = Vec::new();
    match category {
        Some(category) => {
            let mut stmt = conn.prepare(
                "SELECT category, name, mode, created_at, updated_at FROM secrets
                 WHERE category = ?1 ORDER BY category, name",
            )?;
            for row in stmt.query_map([category], summary_from_row)? {
                out.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT category, name, mode, created_at, updated_at FROM secrets
                 ORDER BY category, name",
            )?;
            for row in stmt.query_map([], summary_from_row)? {
                out.push(row?);
            }
        }
    }
    Ok(out)
}

/// `(category, name)` of every record, snapshot taken before any rewrite
pub fn list_secret_keys(conn: &Connection) -> rusqlite::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT category, name FROM secrets ORDER BY category, name")?;
    let keys = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(keys)
}

/// Returns whether a row was removed; a missing row is not an error
pub fn delete_secret(conn: &Connection, category: &str, name: &str) -> rusqlite::Result<bool> {
    let removed = conn.execute(
        "DELETE FROM secrets WHERE category = ?1 AND name = ?2",
        params![category, name],
    )?;
    Ok(removed > 0)
}

pub fn count_secrets(conn: &Connection) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM secrets", [], |row| row.get(0))?;
    Ok(count as u64)
}
