//! Needle record data model.
//!
//! A [`RecordDraft`] is what the intake form produces. The store turns it into a
//! [`NeedleRecord`] by filing it under a bed and stamping the identifier and the needling
//! start time. Field names on the wire are camelCase.

use chrono::{DateTime, Utc};
use needle_types::{BedId, NeedleCounts, PatientId};
use needle_uuid::RecordId;
use serde::{Deserialize, Serialize};

/// Partial record supplied when a bed is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    pub patient_id: PatientId,
    pub counts: NeedleCounts,
    /// Sum of `counts` when the form was submitted.
    pub total: u32,
    pub scan_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub moxibustion_count: u32,
    #[serde(default)]
    pub cupping: bool,
    #[serde(default)]
    pub electroacupuncture_pairs: u32,
    #[serde(default)]
    pub remarks: String,
}

/// One treatment episode as stored on a bed and in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeedleRecord {
    pub id: RecordId,
    pub patient_id: PatientId,
    pub bed_id: BedId,
    pub counts: NeedleCounts,
    /// Stored at save time and never recomputed from `counts`.
    pub total: u32,
    pub scan_timestamp: DateTime<Utc>,
    pub acupuncture_timestamp: Option<DateTime<Utc>>,
    pub removal_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub moxibustion_count: u32,
    #[serde(default)]
    pub cupping: bool,
    #[serde(default)]
    pub electroacupuncture_pairs: u32,
    #[serde(default)]
    pub remarks: String,
}

impl NeedleRecord {
    /// Files `draft` under `bed_id`. Needling starts at the scan instant and the record has
    /// not been removed yet.
    pub fn from_draft(id: RecordId, bed_id: BedId, draft: RecordDraft) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            bed_id,
            counts: draft.counts,
            total: draft.total,
            scan_timestamp: draft.scan_timestamp,
            acupuncture_timestamp: Some(draft.scan_timestamp),
            removal_timestamp: None,
            moxibustion_count: draft.moxibustion_count,
            cupping: draft.cupping,
            electroacupuncture_pairs: draft.electroacupuncture_pairs,
            remarks: draft.remarks,
        }
    }

    /// True if any supplementary treatment was recorded.
    pub fn has_additional_items(&self) -> bool {
        self.moxibustion_count > 0
            || self.cupping
            || self.electroacupuncture_pairs > 0
            || !self.remarks.trim().is_empty()
    }
}
