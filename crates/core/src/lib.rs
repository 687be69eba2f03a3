//! # Needle Core
//!
//! Core business logic for the acupuncture needle count system.
//!
//! This crate contains the bed and history data model and everything that operates on it:
//! - [`store::BedDataStore`]: active record per bed plus the newest-first history log,
//!   persisted through [`needle_storage::LocalStore`]
//! - [`intake::IntakeForm`]: operator input for one scanned patient
//! - [`history`]: read-time filtering of the log by calendar day
//! - [`views`] and [`routes`]: text rendering of the navigable views
//! - [`scan`]: the scan input seam that yields decoded patient identifiers
//!
//! **No process concerns**: reading the environment, logging setup and terminal I/O belong in
//! `needle-cli`.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod intake;
pub mod record;
pub mod routes;
pub mod scan;
pub mod store;
pub mod views;

pub use clock::{Clock, SystemClock};
pub use config::CoreConfig;
pub use error::{NeedleError, NeedleResult};
pub use intake::IntakeForm;
pub use record::{NeedleRecord, RecordDraft};
pub use routes::Route;
pub use store::{BedDataStore, BedMap};

pub use needle_storage::LocalStore;
pub use needle_types::{BedId, BodyRegion, NeedleCounts, PatientId};
pub use needle_uuid::RecordId;
