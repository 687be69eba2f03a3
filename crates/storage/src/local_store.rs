//! Directory-backed JSON document store.
//!
//! [`LocalStore`] is bound to a single root directory. Each key maps to
//! `<root>/<key>.json`. The root is created lazily on the first write, so opening a store
//! never touches the filesystem.

use crate::{StorageError, StorageResult, CORRUPT_MARKER, DOCUMENT_EXTENSION, MAX_KEY_LENGTH};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Key-value store persisting JSON documents under a root directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Binds a store to `root`. No I/O happens until the first read or write.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the document stored under `key`, falling back to `default`.
    ///
    /// Absent documents silently yield `default`. Unreadable documents also yield `default`
    /// and are logged. A document that cannot be parsed as `T` is moved aside to
    /// `<key>.corrupt-<timestamp>.json` first, so the next write under `key` cannot destroy
    /// it.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_read(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(StorageError::Json(e)) => {
                match self.quarantine(key) {
                    Ok(backup) => tracing::warn!(
                        "'{}' is unparsable ({}); moved to {} and using default",
                        key,
                        e,
                        backup.display()
                    ),
                    Err(move_err) => tracing::warn!(
                        "'{}' is unparsable ({}) and could not be moved aside: {}",
                        key,
                        e,
                        move_err
                    ),
                }
                default
            }
            Err(e) => {
                tracing::warn!("falling back to default for '{}': {}", key, e);
                default
            }
        }
    }

    /// Persists `value` under `key`, logging instead of failing.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_write(key, value) {
            tracing::warn!("failed to persist '{}': {}", key, e);
        }
    }

    /// Reads the document stored under `key`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no document exists for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid, the file cannot be read, or its content
    /// is not valid JSON for `T`.
    pub fn try_read<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let path = self.document_path(key)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_str(&contents)?;
        Ok(Some(value))
    }

    /// Serialises `value` and replaces the document stored under `key`.
    ///
    /// The document is written to a sibling temporary file, synced, and renamed over the
    /// previous version, so a crash mid-write leaves the old document intact.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid, serialisation fails, or any filesystem
    /// step fails.
    pub fn try_write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let path = self.document_path(key)?;
        let json = serde_json::to_vec_pretty(value)?;

        fs::create_dir_all(&self.root)?;

        let tmp_path = path.with_extension(format!("{}.tmp", DOCUMENT_EXTENSION));
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;

        tracing::debug!("persisted '{}' ({} bytes)", key, json.len());
        Ok(())
    }

    /// Renames the document under `key` to an unused `<key>.corrupt-<timestamp>.json`
    /// sibling and returns the new path.
    fn quarantine(&self, key: &str) -> StorageResult<PathBuf> {
        let path = self.document_path(key)?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ");

        let mut backup = self
            .root
            .join(format!("{}.{}-{}.{}", key, CORRUPT_MARKER, stamp, DOCUMENT_EXTENSION));
        let mut attempt = 1;
        while backup.exists() {
            backup = self.root.join(format!(
                "{}.{}-{}-{}.{}",
                key, CORRUPT_MARKER, stamp, attempt, DOCUMENT_EXTENSION
            ));
            attempt += 1;
        }

        fs::rename(&path, &backup)?;
        Ok(backup)
    }

    /// Returns true if `key` is acceptable as a document name.
    pub fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && key.len() <= MAX_KEY_LENGTH
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }

    fn document_path(&self, key: &str) -> StorageResult<PathBuf> {
        if !Self::is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self
            .root
            .join(format!("{}.{}", key, DOCUMENT_EXTENSION)))
    }
}
