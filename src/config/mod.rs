// src/config/mod.rs
//! Configuration system for envelope-vault
//!
//! TOML file + env overrides, validated and passed explicitly to [`crate::vault::Vault`].

pub use app::{Config, Keys, Paths};

mod app;
mod defaults;
