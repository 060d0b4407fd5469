// src/error.rs
//! Public error type for the entire crate
//!
//! Messages name the operation, the record or file, and the failing step.
//! They never carry key material or plaintext.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing key identifier, storage location, database key, …
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Key-management backend unreachable, access denied, unknown key, bad wrap
    #[error("key provider error: {0}")]
    KeyProvider(String),

    /// AEAD tag mismatch — wrong key or tampered ciphertext
    #[error("authentication failed: ciphertext or associated data does not match the key")]
    Authentication,

    /// Decryption succeeded but the plaintext digest differs from the stored one.
    /// Digests stay out of the message.
    #[error("integrity mismatch: decrypted data does not match its stored digest")]
    IntegrityMismatch,

    #[error("not found: {0}")]
    NotFound(String),

    /// Caller-supplied name or label rejected before touching storage
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Stored envelope cannot be parsed into its parts
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{op} '{target}': {step} failed: {source}")]
    Context {
        op: &'static str,
        target: String,
        step: &'static str,
        #[source]
        source: Box<CoreError>,
    },
}

/// Coarse classification of a [`CoreError`], looking through [`CoreError::Context`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    KeyProvider,
    Authentication,
    IntegrityMismatch,
    NotFound,
    MalformedRecord,
    InvalidInput,
    Storage,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            CoreError::Configuration(_) | CoreError::Toml(_) => ErrorKind::Configuration,
            CoreError::KeyProvider(_) => ErrorKind::KeyProvider,
            CoreError::Authentication => ErrorKind::Authentication,
            CoreError::IntegrityMismatch => ErrorKind::IntegrityMismatch,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::MalformedRecord(_) => ErrorKind::MalformedRecord,
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::Io(_) | CoreError::Sql(_) | CoreError::Json(_) => ErrorKind::Storage,
            CoreError::Context { .. } => unreachable!("root() strips context"),
        }
    }

    /// The innermost error below any number of context layers
    pub fn root(&self) -> &CoreError {
        let mut err = self;
        while let CoreError::Context { source, .. } = err {
            err = source;
        }
        err
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Attach operation / target / step to an error on its way out
pub trait ResultExt<T> {
    fn context(self, op: &'static str, target: &str, step: &'static str) -> Result<T>;
}

impl<T, E: Into<CoreError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, op: &'static str, target: &str, step: &'static str) -> Result<T> {
        self.map_err(|e| CoreError::Context {
            op,
            target: target.to_string(),
            step,
            source: Box::new(e.into()),
        })
    }
}
