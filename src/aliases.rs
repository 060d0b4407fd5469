// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret-bearing types used throughout envelope-vault.
//! Every alias zeroizes its contents on drop.

pub use secure_gate::{dynamic_alias, fixed_alias, random_alias, SecureRandomExt};

// Fixed-size secrets
fixed_alias!(DataKey32, 32); // 256-bit per-item data key (plaintext form)
fixed_alias!(MasterKey32, 32); // soft-KMS master key

// Dynamic secrets
dynamic_alias!(PlainBytes, Vec<u8>); // decrypted file or secret bytes
dynamic_alias!(SecretValue, String); // decrypted secret value handed to callers
dynamic_alias!(DbPassphrase, String); // SQLCipher database key

// Random secrets
random_alias!(RandomDataKey32, 32); // fresh CSPRNG key material
