// tests/config_tests.rs
use std::collections::HashMap;
use std::path::PathBuf;

use envelope_vault::{Config, ErrorKind, KeyMode};
use serial_test::serial;

const FULL: &str = r#"
mode = "local"
user_id = "ops"

[keys]
kms_key_id = "alias/app"
db_key = "hunter2"

[paths]
db = "/var/lib/vault/vault.db"
blob_dir = "/var/lib/vault/blobs"
local_dir = "/var/lib/vault/local"
"#;

const VARS: &[&str] = &[
    "VAULT_MODE",
    "VAULT_USER_ID",
    "VAULT_KMS_KEY",
    "VAULT_DB_KEY",
    "VAULT_KMS_MASTER_KEY",
    "VAULT_DB_PATH",
    "VAULT_BLOB_PATH",
    "VAULT_REMOTE_PATH",
];

/// Removes every `VAULT_*` variable on creation and on drop
struct CleanEnv;

impl CleanEnv {
    fn new() -> Self {
        for var in VARS {
            std::env::remove_var(var);
        }
        CleanEnv
    }
}

impl Drop for CleanEnv {
    fn drop(&mut self) {
        for var in VARS {
            std::env::remove_var(var);
        }
    }
}

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_full_toml_parses() {
    let config = Config::from_toml_str(FULL).unwrap();
    assert_eq!(config.mode, KeyMode::Local);
    assert_eq!(config.user_id, "ops");
    assert_eq!(config.keys.kms_key_id.as_deref(), Some("alias/app"));
    assert_eq!(config.keys.db_key.as_deref(), Some("hunter2"));
    assert_eq!(config.paths.db, PathBuf::from("/var/lib/vault/vault.db"));
    assert_eq!(config.paths.blob_dir, Some(PathBuf::from("/var/lib/vault/blobs")));
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.mode, KeyMode::Remote);
    assert_eq!(config.user_id, "anonymous");
    assert!(config.keys.db_key.is_none());
    assert!(config.paths.db.ends_with("vault.db"));
}

#[test]
fn test_kms_is_accepted_as_remote() {
    let config = Config::from_toml_str(r#"mode = "kms""#).unwrap();
    assert_eq!(config.mode, KeyMode::Remote);
    assert_eq!("KMS".parse::<KeyMode>().unwrap(), KeyMode::Remote);
}

#[test]
fn test_unknown_mode_is_configuration_error() {
    assert!(Config::from_toml_str(r#"mode = "sideways""#).is_err());

    let mut config = Config::default();
    let err = config
        .apply_overrides(lookup(&[("VAULT_MODE", "sideways")]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_overrides_replace_file_values() {
    let mut config = Config::from_toml_str(FULL).unwrap();
    config
        .apply_overrides(lookup(&[
            ("VAULT_MODE", "remote"),
            ("VAULT_KMS_KEY", "alias/override"),
            ("VAULT_DB_PATH", "/tmp/other.db"),
            ("VAULT_USER_ID", "  "),
        ]))
        .unwrap();

    assert_eq!(config.mode, KeyMode::Remote);
    assert_eq!(config.keys.kms_key_id.as_deref(), Some("alias/override"));
    assert_eq!(config.paths.db, PathBuf::from("/tmp/other.db"));
    assert_eq!(config.user_id, "ops", "blank values are ignored");
    assert_eq!(config.keys.db_key.as_deref(), Some("hunter2"));
}

#[test]
fn test_remote_mode_requires_key_id_and_blob_dir() {
    let mut config = Config::default();
    config.mode = KeyMode::Remote;
    config.paths.blob_dir = Some("/tmp/blobs".into());
    assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);

    config.keys.kms_key_id = Some("alias/app".into());
    config.paths.blob_dir = None;
    assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);

    config.paths.blob_dir = Some("/tmp/blobs".into());
    assert!(config.validate().is_ok());
}

#[test]
fn test_local_mode_requires_local_dir() {
    let mut config = Config::default();
    config.mode = KeyMode::Local;
    assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);

    config.paths.local_dir = Some("/tmp/local".into());
    assert!(config.validate().is_ok());
}

#[test]
fn test_debug_output_redacts_keys() {
    let mut config = Config::from_toml_str(FULL).unwrap();
    config.keys.kms_master_key = Some("11".repeat(32));
    let printed = format!("{config:?}");
    assert!(!printed.contains("hunter2"));
    assert!(!printed.contains(&"11".repeat(32)));
    assert!(printed.contains("[REDACTED]"));
    assert!(printed.contains("alias/app"));
}

#[test]
#[serial]
fn test_load_from_missing_file_uses_environment() {
    let _env = CleanEnv::new();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("VAULT_MODE", "local");
    std::env::set_var("VAULT_REMOTE_PATH", dir.path().join("local"));
    std::env::set_var("VAULT_DB_KEY", "from-env");

    let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.mode, KeyMode::Local);
    assert_eq!(config.paths.local_dir, Some(dir.path().join("local")));
    assert_eq!(config.keys.db_key.as_deref(), Some("from-env"));
}

#[test]
#[serial]
fn test_load_from_file_then_environment() {
    let _env = CleanEnv::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vault.toml");
    std::fs::write(&path, FULL).unwrap();
    std::env::set_var("VAULT_USER_ID", "env-user");

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.user_id, "env-user");
    assert_eq!(config.mode, KeyMode::Local);
}

#[test]
#[serial]
fn test_load_from_rejects_unusable_config() {
    let _env = CleanEnv::new();
    let dir = tempfile::tempdir().unwrap();
    // Remote by default, with no key id or blob store configured
    let err = Config::load_from(dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
