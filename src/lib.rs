// src/lib.rs
//! envelope-vault — envelope encryption for named secrets and whole files
//!
//! Features:
//! - Per-item AES-256-GCM data keys, wrapped by a key-management service or kept local
//! - SHA-256 plaintext digests verified after every decryption
//! - SQLCipher-encrypted record database (secrets, file catalog, audit trail)
//! - Per-record, crash-safe key rotation
//! - Zeroize-on-drop handling of every plaintext key

pub mod aliases;
pub mod audit;
pub mod blob;
pub mod config;
pub mod consts;
pub mod core;
pub mod db;
pub mod enums;
pub mod error;
pub mod file_vault;
pub mod keys;
pub mod report;
pub mod rotate_keys;
pub mod secrets;
pub mod vault;

// Re-export everything users need at the crate root
pub use aliases::{DataKey32, PlainBytes, SecretValue};
pub use audit::{AuditEntry, AuditSink, TracingAudit};
pub use blob::{Blob, BlobStore, DirBlobStore, Metadata};
pub use config::Config;
pub use core::DataKey;
pub use enums::{AuditAction, KeyMode};
pub use error::{CoreError, ErrorKind, Result as CoreResult};
pub use file_vault::{DownloadReceipt, FileVault, UploadReceipt};
pub use keys::{KeyManagementService, KeyProvider, Keyring, SoftKms};
pub use report::VaultReport;
pub use rotate_keys::{RotationJob, RotationReport};
pub use secrets::SecretStore;
pub use vault::Vault;
