// src/db/file_db_ops.rs
//! File catalog — one row per stored file name, last upload wins

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::enums::KeyMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    /// SHA-256 of the plaintext; absent for local plain copies
    pub hash: Option<String>,
    pub size: u64,
    pub location: String,
    pub mode: KeyMode,
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<FileEntry> {
    Ok(FileEntry {
        filename: row.get(0)?,
        uploaded_at: row.get(1)?,
        hash: row.get(2)?,
        size: row.get::<_, i64>(3)? as u64,
        location: row.get(4)?,
        mode: row.get(5)?,
    })
}

pub fn record_file(conn: &Connection, entry: &FileEntry) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT OR REPLACE INTO files (filename, uploaded_at, hash, size, location, mode)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            &entry.filename,
            entry.uploaded_at,
            &entry.hash,
            entry.size as i64,
            &entry.location,
            entry.mode,
        ],
    )?;
    Ok(())
}

/// Newest first; `limit = None` returns everything
pub fn list_files(conn: &Connection, limit: Option<usize>) -> rusqlite::Result<Vec<FileEntry>> {
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(
        "SELECT filename, uploaded_at, hash, size, location, mode FROM files
         ORDER BY uploaded_at DESC, filename LIMIT ?1",
    )?;
    let entries = stmt
        .query_map([limit], entry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

/// `(file count, total plaintext bytes)`
pub fn file_totals(conn: &Connection) -> rusqlite::Result<(u64, u64)> {
    conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(size), 0) FROM files",
        [],
        |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as u64)),
    )
}
