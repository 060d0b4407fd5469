// src/db/mod.rs
//! SQLCipher-backed persistence
//!
//! One encrypted database holds the secret records, the file catalog and the
//! audit trail. Every function takes the connection explicitly.

pub mod audit_db_ops;
pub mod file_db_ops;
pub mod secret_db_ops;
pub mod vault_db_conn;

pub use audit_db_ops::{list_audit, AuditRecord, SqliteAuditLog};
pub use file_db_ops::{list_files, record_file, FileEntry};
pub use secret_db_ops::{SecretRecord, SecretSummary};
pub use vault_db_conn::open_vault_db;
