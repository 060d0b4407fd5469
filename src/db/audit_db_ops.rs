// src/db/audit_db_ops.rs
//! SQLite audit trail

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::audit::{AuditEntry, AuditSink};
use crate::error::Result;

/// [`AuditSink`] writing into the `audit` table of the record database
pub struct SqliteAuditLog<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteAuditLog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AuditSink for SqliteAuditLog<'_> {
    fn record(&self, entry: &AuditEntry) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO audit (action, subject, target, location, success, error, ts)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.action.as_str(),
                &entry.subject,
                &entry.target,
                &entry.location,
                entry.success,
                &entry.error,
                entry.at,
            ],
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub id: i64,
    pub action: String,
    pub subject: String,
    pub target: String,
    pub location: String,
    pub success: bool,
    pub error: Option<String>,
    pub ts: DateTime<Utc>,
}

/// Most recent first
pub fn list_audit(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<AuditRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, action, subject, target, location, success, error, ts FROM audit
         ORDER BY ts DESC, id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(AuditRecord {
                id: row.get(0)?,
                action: row.get(1)?,
                subject: row.get(2)?,
                target: row.get(3)?,
                location: row.get(4)?,
                success: row.get(5)?,
                error: row.get(6)?,
                ts: row.get(7)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
