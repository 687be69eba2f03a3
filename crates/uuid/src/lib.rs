//! Record identifiers.
//!
//! Every needle record is assigned a unique identifier when it is created. The identifier is
//! what ties the active record on a bed to its entry in the history log, so clearing a bed
//! never depends on timestamps or patient identifiers being unique.
//!
//! Identifiers use a *canonical* UUID representation: **32 lowercase hexadecimal characters**
//! (no hyphens).
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Notes:
//! - This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
//! - Canonical form is *required* for identifiers read back from storage or supplied on the
//!   command line. Use [`RecordId::parse`] to validate an input string.
//! - Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected.

mod record_id;

pub use record_id::RecordId;

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
