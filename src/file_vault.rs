// src/file_vault.rs
//! Whole-file envelope encryption
//!
//! Remote mode: read → fresh data key → AES-256-GCM (`nonce || ciphertext`,
//! file name as associated data) → blob store, with wrapped key, mode,
//! digest, name, size, timestamp and uploader as blob metadata.
//!
//! Local mode is a deliberate reduced-security fast path: the file is copied
//! byte for byte into the configured local directory. No key is generated and
//! nothing is encrypted. Local-mode *secrets* are still encrypted; only files
//! take the plain-copy path.
//!
//! Every upload and download attempt is audited, including failures.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use rusqlite::Connection;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::aliases::PlainBytes;
use crate::audit::{record_best_effort, AuditEntry, AuditSink};
use crate::blob::{BlobStore, Metadata};
use crate::consts::{
    LOCATION_BLOB, LOCATION_LOCAL, META_FILE_HASH, META_MODE, META_ORIGINAL_NAME, META_SIZE,
    META_UPLOADED_AT, META_UPLOADER, META_WRAPPED_KEY,
};
use crate::core::crypto::{open_prefixed, seal_prefixed};
use crate::core::integrity;
use crate::db::file_db_ops::{record_file, FileEntry};
use crate::enums::{AuditAction, KeyMode};
use crate::error::{CoreError, Result, ResultExt};
use crate::keys::Keyring;

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Blob key — the file's base name
    pub name: String,
    pub size: u64,
    /// `None` for local plain copies
    pub digest: Option<String>,
    pub mode: KeyMode,
    pub location: &'static str,
}

/// Outcome of a successful download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub name: String,
    pub size: u64,
    pub digest: Option<String>,
    pub destination: PathBuf,
    pub location: &'static str,
}

/// Base name used as the envelope's identity
fn blob_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CoreError::InvalidInput(format!("'{}' has no usable file name", path.display()))
        })
}

fn required<'m>(meta: &'m Metadata, key: &str, name: &str) -> Result<&'m str> {
    meta.get(key).map(String::as_str).ok_or_else(|| {
        CoreError::MalformedRecord(format!("envelope '{name}' is missing '{key}' metadata"))
    })
}

fn parent_dir(dest: &Path) -> &Path {
    match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Write `data` next to `dest` and rename into place
fn write_atomically(dest: &Path, data: &[u8]) -> Result<()> {
    let parent = parent_dir(dest);
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| CoreError::Io(e.error))?;
    Ok(())
}

/// Copy `src` to `dest` through a temp file renamed into place.
/// Copying a file onto itself leaves it untouched.
fn copy_atomically(src: &Path, dest: &Path) -> io::Result<u64> {
    let src = fs::canonicalize(src)?;
    if fs::canonicalize(dest).is_ok_and(|dest| dest == src) {
        debug!(path = %src.display(), "source and destination are the same file");
        return Ok(fs::metadata(&src)?.len());
    }

    let parent = parent_dir(dest);
    fs::create_dir_all(parent)?;
    let mut reader = fs::File::open(&src)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    let size = io::copy(&mut reader, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(size)
}

pub struct FileVault<'a> {
    keys: &'a Keyring,
    audit: Box<dyn AuditSink + 'a>,
    uploader: &'a str,
    blobs: Option<&'a dyn BlobStore>,
    local_dir: Option<&'a Path>,
    catalog: Option<&'a Connection>,
}

impl<'a> FileVault<'a> {
    pub fn new(keys: &'a Keyring, audit: Box<dyn AuditSink + 'a>, uploader: &'a str) -> Self {
        Self {
            keys,
            audit,
            uploader,
            blobs: None,
            local_dir: None,
            catalog: None,
        }
    }

    /// Store for remote-mode envelopes
    pub fn with_blob_store(mut self, blobs: &'a dyn BlobStore) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// Directory for local-mode plain copies
    pub fn with_local_dir(mut self, dir: &'a Path) -> Self {
        self.local_dir = Some(dir);
        self
    }

    /// Record successful uploads in the `files` table
    pub fn with_catalog(mut self, conn: &'a Connection) -> Self {
        self.catalog = Some(conn);
        self
    }

    fn mode(&self) -> KeyMode {
        self.keys.default_mode()
    }

    fn blob_store(&self) -> Result<&'a dyn BlobStore> {
        self.blobs.ok_or_else(|| {
            CoreError::Configuration("no blob store configured (paths.blob_dir)".into())
        })
    }

    fn local_root(&self) -> Result<&'a Path> {
        self.local_dir.ok_or_else(|| {
            CoreError::Configuration("no local directory configured (paths.local_dir)".into())
        })
    }

    fn location(&self) -> &'static str {
        match self.mode() {
            KeyMode::Remote => LOCATION_BLOB,
            KeyMode::Local => LOCATION_LOCAL,
        }
    }

    pub fn upload<P: AsRef<Path>>(&self, path: P) -> Result<UploadReceipt> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let outcome = blob_name(path).and_then(|name| match self.mode() {
            KeyMode::Remote => self.upload_envelope(path, &name),
            KeyMode::Local => self.upload_local_copy(path, &name),
        });

        let target = outcome.as_ref().map(|r| r.name.clone()).unwrap_or(display);
        let entry = AuditEntry::new(AuditAction::Upload, self.uploader, &target, self.location())
            .with_outcome(&outcome);
        record_best_effort(self.audit.as_ref(), &entry);

        if let Ok(receipt) = &outcome {
            self.catalog_upload(receipt);
            info!(name = %receipt.name, size = receipt.size, mode = %receipt.mode, "file uploaded");
        }
        outcome
    }

    fn upload_envelope(&self, path: &Path, name: &str) -> Result<UploadReceipt> {
        let blobs = self.blob_store().context("upload", name, "open blob store")?;
        let plaintext = PlainBytes::new(fs::read(path).context("upload", name, "read file")?);

        // Zeroed when this function returns, success or not
        let data_key = self
            .keys
            .generate()
            .context("upload", name, "generate data key")?;
        let envelope = seal_prefixed(
            data_key.plaintext(),
            plaintext.expose_secret(),
            name.as_bytes(),
        )
        .context("upload", name, "encrypt")?;

        let digest = integrity::digest(plaintext.expose_secret());
        let size = plaintext.expose_secret().len() as u64;

        let mut meta = Metadata::new();
        meta.insert(META_WRAPPED_KEY.into(), STANDARD.encode(data_key.wrapped()));
        meta.insert(META_MODE.into(), data_key.mode().to_string());
        meta.insert(META_FILE_HASH.into(), digest.clone());
        meta.insert(META_ORIGINAL_NAME.into(), name.to_string());
        meta.insert(META_SIZE.into(), size.to_string());
        meta.insert(META_UPLOADED_AT.into(), Utc::now().to_rfc3339());
        meta.insert(META_UPLOADER.into(), self.uploader.to_string());

        blobs
            .put(name, &envelope, &meta)
            .context("upload", name, "store envelope")?;

        Ok(UploadReceipt {
            name: name.to_string(),
            size,
            digest: Some(digest),
            mode: data_key.mode(),
            location: LOCATION_BLOB,
        })
    }

    fn upload_local_copy(&self, path: &Path, name: &str) -> Result<UploadReceipt> {
        let root = self.local_root().context("upload", name, "resolve local dir")?;
        let size = copy_atomically(path, &root.join(name)).context("upload", name, "copy file")?;
        Ok(UploadReceipt {
            name: name.to_string(),
            size,
            digest: None,
            mode: KeyMode::Local,
            location: LOCATION_LOCAL,
        })
    }

    fn catalog_upload(&self, receipt: &UploadReceipt) {
        let Some(conn) = self.catalog else { return };
        let entry = FileEntry {
            filename: receipt.name.clone(),
            uploaded_at: Utc::now(),
            hash: receipt.digest.clone(),
            size: receipt.size,
            location: receipt.location.to_string(),
            mode: receipt.mode,
        };
        if let Err(err) = record_file(conn, &entry) {
            warn!(name = %receipt.name, error = %err, "file catalog update failed");
        }
    }

    /// Fetch `name` and write its plaintext to `dest`
    pub fn download<P: AsRef<Path>>(&self, name: &str, dest: P) -> Result<DownloadReceipt> {
        let dest = dest.as_ref();
        let normalized = blob_name(Path::new(name));
        let target = normalized.as_deref().unwrap_or(name).to_string();
        let outcome = normalized.and_then(|name| match self.mode() {
            KeyMode::Remote => self.download_envelope(&name, dest),
            KeyMode::Local => self.download_local_copy(&name, dest),
        });

        let entry = AuditEntry::new(AuditAction::Download, self.uploader, &target, self.location())
            .with_outcome(&outcome);
        record_best_effort(self.audit.as_ref(), &entry);

        if let Ok(receipt) = &outcome {
            info!(name = %receipt.name, dest = %receipt.destination.display(), "file downloaded");
        }
        outcome
    }

    fn download_envelope(&self, name: &str, dest: &Path) -> Result<DownloadReceipt> {
        let blobs = self.blob_store().context("download", name, "open blob store")?;
        let blob = blobs.get(name).context("download", name, "fetch envelope")?;

        let meta = &blob.metadata;
        let wrapped_b64 =
            required(meta, META_WRAPPED_KEY, name).context("download", name, "parse metadata")?;
        let mode_tag =
            required(meta, META_MODE, name).context("download", name, "parse metadata")?;
        let expected =
            required(meta, META_FILE_HASH, name).context("download", name, "parse metadata")?;

        let wrapped = STANDARD
            .decode(wrapped_b64)
            .map_err(|_| {
                CoreError::MalformedRecord(format!("envelope '{name}' wrapped key is not base64"))
            })
            .context("download", name, "parse metadata")?;
        let mode: KeyMode = mode_tag
            .parse()
            .map_err(|_| {
                CoreError::MalformedRecord(format!("envelope '{name}' has an unknown key mode"))
            })
            .context("download", name, "parse metadata")?;

        // The envelope's own mode picks the unwrap path
        let data_key = self
            .keys
            .unwrap(&wrapped, mode)
            .context("download", name, "unwrap data key")?;
        let plaintext = open_prefixed(data_key.plaintext(), &blob.data, name.as_bytes())
            .context("download", name, "decrypt")?;
        integrity::ensure(plaintext.expose_secret(), expected)
            .context("download", name, "verify digest")?;

        write_atomically(dest, plaintext.expose_secret())
            .context("download", name, "write destination")?;

        Ok(DownloadReceipt {
            name: name.to_string(),
            size: plaintext.expose_secret().len() as u64,
            digest: Some(expected.to_string()),
            destination: dest.to_path_buf(),
            location: LOCATION_BLOB,
        })
    }

    fn download_local_copy(&self, name: &str, dest: &Path) -> Result<DownloadReceipt> {
        let root = self.local_root().context("download", name, "resolve local dir")?;
        let src = root.join(name);
        if !src.is_file() {
            return Err(CoreError::NotFound(format!("file '{name}' in local store")))
                .context("download", name, "locate file");
        }
        let size = copy_atomically(&src, dest).context("download", name, "copy file")?;
        Ok(DownloadReceipt {
            name: name.to_string(),
            size,
            digest: None,
            destination: dest.to_path_buf(),
            location: LOCATION_LOCAL,
        })
    }
}
