// tests/common.rs
//! Shared test utilities — logging setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Test-friendly logging; respects RUST_LOG and is safe to call repeatedly
#[allow(dead_code)]
pub fn setup() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}
