// tests/key_provider_tests.rs
mod common;

use std::sync::Arc;

use envelope_vault::keys::{LocalKeyProvider, RemoteKeyProvider};
use envelope_vault::{ErrorKind, KeyMode, KeyProvider, Keyring, SoftKms};

const KEY_ID: &str = "alias/keys-test";

fn remote_keyring(default_mode: KeyMode) -> Keyring {
    let kms = SoftKms::new().with_random_key(KEY_ID);
    let remote = RemoteKeyProvider::new(KEY_ID, Box::new(kms)).unwrap();
    Keyring::new(default_mode, Some(remote))
}

#[test]
fn test_local_keys_are_stored_raw() {
    let key = LocalKeyProvider.generate_data_key().unwrap();
    assert_eq!(key.mode(), KeyMode::Local);
    assert_eq!(key.wrapped(), key.plaintext().as_slice());

    let again = LocalKeyProvider.unwrap_data_key(key.wrapped()).unwrap();
    assert_eq!(again.plaintext(), key.plaintext());
}

#[test]
fn test_every_generated_key_is_fresh() {
    let keyring = remote_keyring(KeyMode::Remote);
    let a = keyring.generate().unwrap();
    let b = keyring.generate().unwrap();
    assert_ne!(a.plaintext(), b.plaintext());
    assert_ne!(a.wrapped(), b.wrapped());
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_remote_keys_are_wrapped_and_unwrap_to_the_same_key() {
    common::setup();
    let keyring = remote_keyring(KeyMode::Remote);
    let key = keyring.generate().unwrap();
    assert_eq!(key.mode(), KeyMode::Remote);
    assert_ne!(key.wrapped(), key.plaintext().as_slice());

    let unwrapped = keyring.unwrap(key.wrapped(), KeyMode::Remote).unwrap();
    assert_eq!(unwrapped.plaintext(), key.plaintext());
}

#[test]
fn test_keys_never_cross_unwrap_between_modes() {
    let keyring = remote_keyring(KeyMode::Remote);

    let remote = keyring.provider(KeyMode::Remote).unwrap().generate_data_key().unwrap();
    let err = keyring.unwrap(remote.wrapped(), KeyMode::Local).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyProvider);

    let local = keyring.provider(KeyMode::Local).unwrap().generate_data_key().unwrap();
    let err = keyring.unwrap(local.wrapped(), KeyMode::Remote).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyProvider);
}

#[test]
fn test_keyring_generates_with_its_default_mode() {
    assert_eq!(remote_keyring(KeyMode::Local).generate().unwrap().mode(), KeyMode::Local);
    assert_eq!(remote_keyring(KeyMode::Remote).generate().unwrap().mode(), KeyMode::Remote);
}

#[test]
fn test_remote_mode_without_provider_is_configuration_error() {
    let keyring = Keyring::new(KeyMode::Remote, None);
    assert_eq!(keyring.generate().unwrap_err().kind(), ErrorKind::Configuration);
    assert_eq!(
        keyring.unwrap(&[0u8; 64], KeyMode::Remote).unwrap_err().kind(),
        ErrorKind::Configuration
    );

    let local_only = Keyring::local_only();
    assert_eq!(local_only.generate().unwrap().mode(), KeyMode::Local);
}

#[test]
fn test_remote_provider_needs_a_key_id() {
    let err = RemoteKeyProvider::new("  ", Box::new(SoftKms::new()))
        .err()
        .expect("blank key id must be rejected");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_unknown_key_id_is_a_key_provider_error() {
    let kms = SoftKms::new().with_random_key("alias/other");
    let provider = RemoteKeyProvider::new(KEY_ID, Box::new(kms)).unwrap();
    assert_eq!(
        provider.generate_data_key().unwrap_err().kind(),
        ErrorKind::KeyProvider
    );
}

#[test]
fn test_wrapped_key_from_another_service_is_rejected() {
    let shared = Arc::new(SoftKms::new().with_random_key(KEY_ID));
    let ours = RemoteKeyProvider::new(KEY_ID, Box::new(Arc::clone(&shared))).unwrap();
    let theirs = RemoteKeyProvider::new(
        KEY_ID,
        Box::new(SoftKms::new().with_random_key(KEY_ID)),
    )
    .unwrap();

    let key = ours.generate_data_key().unwrap();
    assert!(ours.unwrap_data_key(key.wrapped()).is_ok());
    assert_eq!(
        theirs.unwrap_data_key(key.wrapped()).unwrap_err().kind(),
        ErrorKind::KeyProvider
    );
}
