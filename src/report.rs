// src/report.rs
//! Storage summary: stored files, total size, recent uploads, secret count

use std::fmt;

use rusqlite::Connection;
use serde::Serialize;

use crate::consts::REPORT_RECENT_UPLOADS;
use crate::db::file_db_ops::{file_totals, list_files, FileEntry};
use crate::db::secret_db_ops::count_secrets;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct VaultReport {
    pub files_stored: u64,
    pub total_size_bytes: u64,
    pub recent_uploads: Vec<FileEntry>,
    pub secrets_stored: u64,
}

impl VaultReport {
    pub fn collect(conn: &Connection) -> Result<Self> {
        let (files_stored, total_size_bytes) = file_totals(conn)?;
        Ok(Self {
            files_stored,
            total_size_bytes,
            recent_uploads: list_files(conn, Some(REPORT_RECENT_UPLOADS))?,
            secrets_stored: count_secrets(conn)?,
        })
    }

    pub fn total_size_mb(&self) -> f64 {
        self.total_size_bytes as f64 / 1024.0 / 1024.0
    }
}

impl fmt::Display for VaultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files stored:   {}", self.files_stored)?;
        writeln!(f, "Total size:     {:.2} MB", self.total_size_mb())?;
        writeln!(f, "Secrets stored: {}", self.secrets_stored)?;
        writeln!(f)?;
        writeln!(f, "Recent uploads:")?;
        if self.recent_uploads.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for entry in &self.recent_uploads {
            writeln!(
                f,
                "  - {} ({}, {} bytes, {})",
                entry.filename,
                entry.uploaded_at.to_rfc3339(),
                entry.size,
                entry.location
            )?;
        }
        Ok(())
    }
}
