// tests/rotation_tests.rs
mod common;
mod support;

use envelope_vault::core::integrity;
use envelope_vault::{AuditAction, KeyMode};
use rusqlite::params;
use support::TestVault;

fn seed(tv: &TestVault) {
    let secrets = tv.vault.secrets();
    secrets.add("db", "password", "s3cr3t").unwrap();
    secrets.add("db", "user", "admin").unwrap();
    secrets.add("api", "token", "tok-123").unwrap();
}

#[test]
fn test_rotation_rewraps_every_record_and_keeps_values() {
    common::setup();
    let tv = TestVault::new(KeyMode::Remote);
    seed(&tv);
    let before = tv.raw_secret("db", "password");

    let report = tv.vault.rotate().unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.rotated, 3);
    assert!(report.is_clean());

    let after = tv.raw_secret("db", "password");
    assert_ne!(before.0, after.0, "wrapped key changes");
    assert_ne!(before.1, after.1, "nonce changes");
    assert_ne!(before.2, after.2, "ciphertext changes");

    let secrets = tv.vault.secrets();
    assert_eq!(secrets.get("db", "password").unwrap().expose_secret().as_str(), "s3cr3t");
    assert_eq!(secrets.get("db", "user").unwrap().expose_secret().as_str(), "admin");
    assert_eq!(secrets.get("api", "token").unwrap().expose_secret().as_str(), "tok-123");
    assert_eq!(tv.secret_rows(), 3);
}

#[test]
fn test_rotation_twice_is_safe() {
    let tv = TestVault::new(KeyMode::Local);
    seed(&tv);

    assert_eq!(tv.vault.secrets().rotate().unwrap(), 3);
    assert_eq!(tv.vault.secrets().rotate().unwrap(), 3);
    assert_eq!(
        tv.vault.secrets().get("db", "user").unwrap().expose_secret().as_str(),
        "admin"
    );
}

#[test]
fn test_rotation_of_empty_store_does_nothing() {
    let tv = TestVault::new(KeyMode::Remote);
    let report = tv.vault.rotate().unwrap();
    assert_eq!(report.total, 0);
    assert_eq!(report.rotated, 0);
    assert!(report.is_clean());
}

#[test]
fn test_corrupt_record_is_left_untouched_and_others_rotate() {
    let tv = TestVault::new(KeyMode::Remote);
    seed(&tv);

    let (_, _, mut ciphertext, _) = tv.raw_secret("db", "user");
    ciphertext[0] ^= 0xFF;
    tv.vault
        .connection()
        .execute(
            "UPDATE secrets SET ciphertext = ?1 WHERE category = 'db' AND name = 'user'",
            params![ciphertext],
        )
        .unwrap();
    let corrupt_before = tv.raw_secret("db", "user");
    let healthy_before = tv.raw_secret("api", "token");

    let report = tv.vault.rotate().unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.rotated, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].category, "db");
    assert_eq!(report.failed[0].name, "user");
    assert!(report.failed[0].error.contains("decrypt"));

    assert_eq!(tv.raw_secret("db", "user"), corrupt_before);
    assert_ne!(tv.raw_secret("api", "token").0, healthy_before.0);
    assert_eq!(
        tv.vault.secrets().get("db", "password").unwrap().expose_secret().as_str(),
        "s3cr3t"
    );
}

#[test]
fn test_rotation_moves_records_to_current_default_mode() {
    let tv = TestVault::new(KeyMode::Local);
    seed(&tv);

    let remote = tv.reopen(KeyMode::Remote);
    let report = remote.rotate().unwrap();
    assert_eq!(report.rotated, 3);

    assert!(remote
        .secrets()
        .list(None)
        .unwrap()
        .iter()
        .all(|s| s.mode == KeyMode::Remote));
    assert_eq!(
        remote.secrets().get("api", "token").unwrap().expose_secret().as_str(),
        "tok-123"
    );
}

#[test]
fn test_rotation_is_audited() {
    let tv = TestVault::new(KeyMode::Remote);
    seed(&tv);
    tv.vault.rotate().unwrap();

    let audit = tv.vault.list_audit(None).unwrap();
    let rotate = audit
        .iter()
        .find(|r| r.action == AuditAction::Rotate.as_str())
        .expect("rotation audit row");
    assert!(rotate.success);
    assert_eq!(rotate.subject, "tester");
    assert_eq!(rotate.location, "secrets");
}

#[test]
fn test_partial_rotation_is_audited_as_failure() {
    let tv = TestVault::new(KeyMode::Local);
    seed(&tv);
    tv.vault
        .connection()
        .execute(
            "UPDATE secrets SET integrity_hash = '00' WHERE category = 'api'",
            [],
        )
        .unwrap();

    let report = tv.vault.rotate().unwrap();
    assert_eq!(report.failed.len(), 1);

    let audit = tv.vault.list_audit(Some(1)).unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "rotate");
    assert!(!audit[0].success);
    let error = audit[0].error.as_deref().unwrap();
    assert!(error.contains("api/token"));
    assert!(!error.contains("tok-123"));
    assert!(!error.contains(&integrity::digest(b"tok-123")));
}
