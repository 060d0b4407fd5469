// src/blob/mod.rs
//! Blob storage for file envelopes
//!
//! A blob is an opaque byte payload plus string metadata that must round-trip
//! unmodified. Stores are keyed by a plain file name; `put` on an existing
//! key replaces it.

mod dir;

pub use dir::DirBlobStore;

use std::collections::BTreeMap;

use crate::error::Result;

pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
    pub metadata: Metadata,
}

pub trait BlobStore {
    fn put(&self, key: &str, data: &[u8], metadata: &Metadata) -> Result<()>;

    /// [`crate::error::CoreError::NotFound`] when nothing is stored under `key`
    fn get(&self, key: &str) -> Result<Blob>;
}
