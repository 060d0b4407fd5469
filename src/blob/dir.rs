// src/blob/dir.rs
//! Directory-backed blob store
//!
//! Each blob is one file `<root>/<key>.envelope`:
//! `b"EVB1" || meta_len:u32be || metadata JSON || data`.
//! Files are written to a temp file in `root` and renamed into place, so a
//! reader sees either the previous envelope or the new one, never a mix.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::blob::{Blob, BlobStore, Metadata};
use crate::error::{CoreError, Result};

const MAGIC: &[u8; 4] = b"EVB1";
const HEADER_LEN: usize = MAGIC.len() + 4;
const EXTENSION: &str = "envelope";

#[derive(Debug, Clone)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    /// Use `root` as the store, creating it if missing
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf> {
        let is_plain_name = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(&['/', '\\', '\0'][..]);
        if !is_plain_name {
            return Err(CoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("blob key '{key}' is not a plain file name"),
            )));
        }
        Ok(self.root.join(format!("{key}.{EXTENSION}")))
    }
}

impl BlobStore for DirBlobStore {
    fn put(&self, key: &str, data: &[u8], metadata: &Metadata) -> Result<()> {
        let path = self.blob_path(key)?;
        let meta = serde_json::to_vec(metadata)?;
        let meta_len = u32::try_from(meta.len()).map_err(|_| {
            CoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "blob metadata too large",
            ))
        })?;

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(MAGIC)?;
        tmp.write_all(&meta_len.to_be_bytes())?;
        tmp.write_all(&meta)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| CoreError::Io(e.error))?;

        debug!(key, bytes = data.len(), "blob stored");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Blob> {
        let path = self.blob_path(key)?;
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CoreError::NotFound(format!("blob '{key}'")));
            }
            Err(e) => return Err(e.into()),
        };

        if raw.len() < HEADER_LEN || &raw[..MAGIC.len()] != MAGIC {
            return Err(CoreError::MalformedRecord(format!(
                "blob '{key}' has no envelope header"
            )));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&raw[MAGIC.len()..HEADER_LEN]);
        let meta_end = HEADER_LEN + u32::from_be_bytes(len_bytes) as usize;
        if raw.len() < meta_end {
            return Err(CoreError::MalformedRecord(format!(
                "blob '{key}' metadata is truncated"
            )));
        }

        let metadata: Metadata = serde_json::from_slice(&raw[HEADER_LEN..meta_end])
            .map_err(|e| CoreError::MalformedRecord(format!("blob '{key}' metadata: {e}")))?;
        Ok(Blob {
            data: raw[meta_end..].to_vec(),
            metadata,
        })
    }
}
