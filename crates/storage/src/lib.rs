//! Local key-value storage
//!
//! This crate provides the persistence layer for the needle count system: a directory of
//! JSON documents, one document per key, written synchronously.
//!
//! ## Design Principles
//!
//! - Reads never fail from the caller's point of view: absent, unparsable or unreadable
//!   documents fall back to a caller-supplied default
//! - An unparsable document is moved aside before the default is used, never overwritten
//! - Every write replaces the whole document for its key
//! - Writes are durable once they return (written to a temporary file, synced, renamed)
//! - Keys are plain names and can never address anything outside the store root
//!
//! ## Storage Layout
//!
//! ```text
//! <root>/
//! ├── bedData.json
//! ├── acupunctureHistory.json
//! └── acupunctureHistory.corrupt-20260302T090000123Z.json   (only after a failed parse)
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use needle_storage::LocalStore;
//!
//! let store = LocalStore::open("needle_data");
//! let visits: Vec<String> = store.read("visits", Vec::new());
//! store.write("visits", &visits);
//! ```

mod constants;
mod local_store;

pub use constants::{CORRUPT_MARKER, DOCUMENT_EXTENSION, MAX_KEY_LENGTH};
pub use local_store::LocalStore;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Key is empty, too long, or contains characters outside `[A-Za-z0-9_-]`
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
