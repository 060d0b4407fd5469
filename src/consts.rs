// src/consts.rs
//! Shared constants — security parameters and defaults

/// Recommended KDF iterations for SQLCipher databases (2025+)
// ~0.1–0.2s on modern hardware — good default
pub const DB_KDF_ITERATIONS: u32 = 256_000;

/// Data key length in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce length in bytes
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag length in bytes
pub const TAG_SIZE: usize = 16;

/// Default config file, overridable with `VAULT_CONFIG`
pub const DEFAULT_CONFIG_FILE: &str = "vault.toml";

/// Default number of audit rows returned by `list_audit`
pub const DEFAULT_AUDIT_LIMIT: usize = 100;

/// Number of uploads shown in the report
pub const REPORT_RECENT_UPLOADS: usize = 5;

/// Blob metadata keys — must round-trip through any `BlobStore`
pub const META_WRAPPED_KEY: &str = "wrapped-key";
pub const META_MODE: &str = "encryption-mode";
pub const META_FILE_HASH: &str = "file-hash";
pub const META_ORIGINAL_NAME: &str = "original-name";
pub const META_SIZE: &str = "size";
pub const META_UPLOADED_AT: &str = "uploaded-at";
pub const META_UPLOADER: &str = "uploader";

/// Storage location labels written to the audit log and file catalog
pub const LOCATION_BLOB: &str = "blob-store";
pub const LOCATION_LOCAL: &str = "local";
pub const LOCATION_SECRETS: &str = "secrets";
