//! Bed data store.
//!
//! [`BedDataStore`] owns the two pieces of persisted state:
//!
//! - the bed map: each configured bed holds zero or one active [`NeedleRecord`];
//! - the history log: every record ever saved, newest first.
//!
//! Both are loaded once from a [`LocalStore`] and rewritten in full after every mutation, each
//! under its own key. The store is the only owner of this state; views borrow it read-only.
//!
//! Mutations take `&mut self`, so there is exactly one writer at a time by construction.

use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::constants::{BED_DATA_KEY, HISTORY_KEY};
use crate::record::{NeedleRecord, RecordDraft};
use needle_storage::LocalStore;
use needle_types::BedId;
use needle_uuid::RecordId;
use std::collections::BTreeMap;

/// Bed identifier to active record. A `None` value is a bed that has been cleared.
pub type BedMap = BTreeMap<BedId, Option<NeedleRecord>>;

/// Process-wide treatment state: active records per bed plus the history log.
#[derive(Debug)]
pub struct BedDataStore<C: Clock = SystemClock> {
    storage: LocalStore,
    clock: C,
    beds: BedMap,
    history: Vec<NeedleRecord>,
}

impl BedDataStore<SystemClock> {
    /// Opens the store under the configured data directory using wall-clock time.
    pub fn open(config: &CoreConfig) -> Self {
        Self::load(LocalStore::open(config.data_dir()), SystemClock)
    }
}

impl<C: Clock> BedDataStore<C> {
    /// Loads persisted state, falling back to no beds and an empty history.
    pub fn load(storage: LocalStore, clock: C) -> Self {
        let beds: BedMap = storage.read(BED_DATA_KEY, BedMap::new());
        let history: Vec<NeedleRecord> = storage.read(HISTORY_KEY, Vec::new());

        tracing::debug!(
            "loaded {} occupied beds and {} history records from {}",
            beds.values().filter(|r| r.is_some()).count(),
            history.len(),
            storage.root().display()
        );

        Self {
            storage,
            clock,
            beds,
            history,
        }
    }

    /// Assigns a new record built from `draft` to `bed_id`.
    ///
    /// Any active record on the bed is replaced without being finalized. The new record is
    /// prepended to the history log. Counts are stored as given.
    pub fn update_bed_data(&mut self, bed_id: BedId, draft: RecordDraft) -> &NeedleRecord {
        let record = NeedleRecord::from_draft(RecordId::new(), bed_id, draft);

        if let Some(Some(previous)) = self.beds.get(&bed_id) {
            tracing::info!(
                "bed {} reassigned; record {} for patient {} replaced",
                bed_id,
                previous.id,
                previous.patient_id
            );
        }
        tracing::info!(
            "bed {} assigned to patient {} with {} needles",
            bed_id,
            record.patient_id,
            record.total
        );

        self.beds.insert(bed_id, Some(record.clone()));
        self.history.insert(0, record);
        self.persist_beds();
        self.persist_history();

        &self.history[0]
    }

    /// Finalizes and removes the active record on `bed_id`.
    ///
    /// Does nothing and returns `None` if the bed is empty. Otherwise the removal time is
    /// written onto the history entry with the same record identifier and the bed becomes
    /// empty. The removal time is never earlier than the record's scan time.
    pub fn clear_bed_data(&mut self, bed_id: BedId) -> Option<NeedleRecord> {
        let mut record = self.beds.get_mut(&bed_id).and_then(Option::take)?;

        let removal = self.clock.now().max(record.scan_timestamp);
        record.removal_timestamp = Some(removal);

        match self.history.iter_mut().find(|entry| entry.id == record.id) {
            Some(entry) => entry.removal_timestamp = Some(removal),
            None => tracing::warn!(
                "record {} on bed {} has no history entry; removal time not logged",
                record.id,
                bed_id
            ),
        }

        tracing::info!(
            "bed {} cleared; patient {} needles removed",
            bed_id,
            record.patient_id
        );

        self.persist_history();
        self.persist_beds();

        Some(record)
    }

    /// Active record on `bed_id`, if any.
    pub fn bed(&self, bed_id: BedId) -> Option<&NeedleRecord> {
        self.beds.get(&bed_id).and_then(Option::as_ref)
    }

    /// True if `bed_id` is configured or still holds a record saved under a larger bed count.
    pub fn is_addressable(&self, config: &CoreConfig, bed_id: BedId) -> bool {
        config.contains_bed(bed_id) || self.bed(bed_id).is_some()
    }

    pub fn beds(&self) -> &BedMap {
        &self.beds
    }

    /// History log, newest first.
    pub fn history(&self) -> &[NeedleRecord] {
        &self.history
    }

    /// Occupied beds in ascending bed order.
    pub fn occupied_beds(&self) -> impl Iterator<Item = (BedId, &NeedleRecord)> {
        self.beds
            .iter()
            .filter_map(|(bed, record)| record.as_ref().map(|r| (*bed, r)))
    }

    fn persist_beds(&self) {
        self.storage.write(BED_DATA_KEY, &self.beds);
    }

    fn persist_history(&self) {
        self.storage.write(HISTORY_KEY, &self.history);
    }
}
