// src/core/mod.rs
//! Core cryptographic building blocks
//!
//! Pure in-memory primitives — no database, no blob store, no key service.

pub mod crypto;
pub mod integrity;
pub mod key;

pub use crypto::{decrypt, encrypt, generate_nonce, open_prefixed, seal, seal_prefixed};
pub use integrity::{digest, key_fingerprint, verify};
pub use key::{generate_key, DataKey};
