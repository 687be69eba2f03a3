//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Library code never reads environment variables itself; the
//! binary resolves them and hands the result over as a [`CoreConfig`].

use crate::constants::{DEFAULT_BED_COUNT, DEFAULT_DATA_DIR, MAX_BED_COUNT};
use crate::{NeedleError, NeedleResult};
use needle_types::BedId;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    bed_count: u16,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `NeedleError::InvalidInput` if `bed_count` is 0 or above the supported maximum.
    pub fn new(data_dir: PathBuf, bed_count: u16) -> NeedleResult<Self> {
        if bed_count == 0 || bed_count > MAX_BED_COUNT {
            return Err(NeedleError::InvalidInput(format!(
                "bed count must be between 1 and {}, got {}",
                MAX_BED_COUNT, bed_count
            )));
        }

        Ok(Self {
            data_dir,
            bed_count,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn bed_count(&self) -> u16 {
        self.bed_count
    }

    /// Every configured bed, in ascending order.
    pub fn bed_ids(&self) -> impl Iterator<Item = BedId> {
        (1..=self.bed_count).filter_map(|n| BedId::new(n).ok())
    }

    /// Returns true if `bed` is one of the configured beds.
    pub fn contains_bed(&self, bed: BedId) -> bool {
        bed.number() <= self.bed_count
    }

    /// Parse a bed number supplied by the operator and check it against the bed range.
    ///
    /// # Errors
    ///
    /// Returns `NeedleError::Types` if `input` is not a bed number and
    /// `NeedleError::UnknownBed` if the bed is not configured.
    pub fn parse_bed(&self, input: &str) -> NeedleResult<BedId> {
        let bed: BedId = input.parse()?;
        if !self.contains_bed(bed) {
            return Err(NeedleError::UnknownBed {
                bed,
                bed_count: self.bed_count,
            });
        }
        Ok(bed)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            bed_count: DEFAULT_BED_COUNT,
        }
    }
}

/// Parse the bed count from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_BED_COUNT`].
pub fn bed_count_from_env_value(value: Option<String>) -> NeedleResult<u16> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_BED_COUNT),
        Some(v) => v.parse::<u16>().map_err(|_| {
            NeedleError::InvalidInput(format!("bed count must be a number, got '{}'", v))
        }),
    }
}

/// Resolve the data directory from an explicit override or an optional string value.
///
/// The override wins; otherwise a non-blank `value` is used; otherwise
/// [`DEFAULT_DATA_DIR`] relative to the working directory.
pub fn data_dir_from_env_value(override_dir: Option<PathBuf>, value: Option<String>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir;
    }

    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
