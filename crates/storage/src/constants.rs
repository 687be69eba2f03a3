/// Extension given to every persisted document.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Longest key accepted by the store.
pub const MAX_KEY_LENGTH: usize = 64;

/// Marker in the file name of a document moved aside because it could not be parsed.
pub const CORRUPT_MARKER: &str = "corrupt";
