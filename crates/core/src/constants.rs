//! Constants used throughout the needle core crate.
//!
//! Storage keys, the bed range and the limits of the intake form live here so the values
//! that end up in persisted documents are defined exactly once.

/// Storage key of the bed map (bed identifier to active record or `null`).
pub const BED_DATA_KEY: &str = "bedData";

/// Storage key of the newest-first history log.
pub const HISTORY_KEY: &str = "acupunctureHistory";

/// Default directory for persisted state when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "needle_data";

/// Number of beds when no explicit bed count is configured.
pub const DEFAULT_BED_COUNT: u16 = 20;

/// Largest bed count accepted by configuration.
pub const MAX_BED_COUNT: u16 = 99;

/// Largest needle count selectable for a single body region.
pub const MAX_REGION_COUNT: u32 = 30;

/// Largest number of moxibustion cones selectable on the intake form.
pub const MAX_MOXIBUSTION_COUNT: u32 = 10;

/// Largest number of electroacupuncture pairs selectable on the intake form.
pub const MAX_ELECTROACUPUNCTURE_PAIRS: u32 = 10;
