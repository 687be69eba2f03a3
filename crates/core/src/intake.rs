//! Intake form state.
//!
//! The form holds what the operator has entered for one scanned patient until it is
//! submitted. Every setter enforces the range the form offers, so a submitted draft only
//! carries values an operator could have picked.

use crate::config::CoreConfig;
use crate::constants::{MAX_ELECTROACUPUNCTURE_PAIRS, MAX_MOXIBUSTION_COUNT, MAX_REGION_COUNT};
use crate::record::RecordDraft;
use crate::{NeedleError, NeedleResult};
use chrono::{DateTime, Utc};
use needle_types::{BedId, BodyRegion, NeedleCounts, PatientId};

/// Transient input for one treatment episode.
#[derive(Debug, Clone)]
pub struct IntakeForm {
    patient_id: PatientId,
    bed_count: u16,
    bed_id: BedId,
    counts: NeedleCounts,
    moxibustion_count: u32,
    cupping: bool,
    electroacupuncture_pairs: u32,
    remarks: String,
}

impl IntakeForm {
    /// Starts an empty form for `patient_id`: all counts zero, bed 1 selected, no
    /// supplementary treatment.
    pub fn new(patient_id: PatientId, config: &CoreConfig) -> Self {
        Self {
            patient_id,
            bed_count: config.bed_count(),
            bed_id: BedId::FIRST,
            counts: NeedleCounts::default(),
            moxibustion_count: 0,
            cupping: false,
            electroacupuncture_pairs: 0,
            remarks: String::new(),
        }
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    pub fn bed_id(&self) -> BedId {
        self.bed_id
    }

    pub fn counts(&self) -> &NeedleCounts {
        &self.counts
    }

    /// Running total shown while the form is being filled in.
    pub fn total(&self) -> u32 {
        self.counts.sum()
    }

    pub fn set_count(&mut self, region: BodyRegion, count: u32) -> NeedleResult<()> {
        check_range(region.as_str(), count, MAX_REGION_COUNT)?;
        self.counts.set(region, count);
        Ok(())
    }

    pub fn set_bed(&mut self, bed_id: BedId) -> NeedleResult<()> {
        if bed_id.number() > self.bed_count {
            return Err(NeedleError::UnknownBed {
                bed: bed_id,
                bed_count: self.bed_count,
            });
        }
        self.bed_id = bed_id;
        Ok(())
    }

    pub fn set_moxibustion_count(&mut self, count: u32) -> NeedleResult<()> {
        check_range("moxibustionCount", count, MAX_MOXIBUSTION_COUNT)?;
        self.moxibustion_count = count;
        Ok(())
    }

    pub fn set_cupping(&mut self, cupping: bool) {
        self.cupping = cupping;
    }

    pub fn set_electroacupuncture_pairs(&mut self, pairs: u32) -> NeedleResult<()> {
        check_range("electroacupuncturePairs", pairs, MAX_ELECTROACUPUNCTURE_PAIRS)?;
        self.electroacupuncture_pairs = pairs;
        Ok(())
    }

    pub fn set_remarks(&mut self, remarks: impl Into<String>) {
        self.remarks = remarks.into();
    }

    /// Consumes the form and produces the draft for the selected bed.
    ///
    /// `total` is computed here, once, from the seven region counts.
    pub fn submit(self, scanned_at: DateTime<Utc>) -> (BedId, RecordDraft) {
        let total = self.counts.sum();
        let draft = RecordDraft {
            patient_id: self.patient_id,
            counts: self.counts,
            total,
            scan_timestamp: scanned_at,
            moxibustion_count: self.moxibustion_count,
            cupping: self.cupping,
            electroacupuncture_pairs: self.electroacupuncture_pairs,
            remarks: self.remarks,
        };
        (self.bed_id, draft)
    }
}

fn check_range(field: &'static str, value: u32, max: u32) -> NeedleResult<()> {
    if value > max {
        return Err(NeedleError::OutOfRange { field, value, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn form() -> IntakeForm {
        let config = CoreConfig::new(PathBuf::from("data"), 20).unwrap();
        IntakeForm::new(PatientId::new("P001").unwrap(), &config)
    }

    fn scanned_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_new_form_defaults() {
        let form = form();
        assert_eq!(form.bed_id().number(), 1);
        assert_eq!(form.total(), 0);
        assert_eq!(form.patient_id().as_str(), "P001");

        let (bed, draft) = form.submit(scanned_at());
        assert_eq!(bed.number(), 1);
        assert_eq!(draft.counts, NeedleCounts::default());
        assert_eq!(draft.moxibustion_count, 0);
        assert!(!draft.cupping);
        assert_eq!(draft.electroacupuncture_pairs, 0);
        assert!(draft.remarks.is_empty());
    }

    #[test]
    fn test_total_is_sum_of_all_regions() {
        // Walk a spread of values across the full 0..=30 range for every region.
        for step in 0..=MAX_REGION_COUNT {
            let mut form = form();
            let mut expected = 0;
            for (i, region) in BodyRegion::ALL.into_iter().enumerate() {
                let count = (step + i as u32 * 7) % (MAX_REGION_COUNT + 1);
                form.set_count(region, count).unwrap();
                expected += count;
            }

            let (_, draft) = form.submit(scanned_at());
            assert_eq!(draft.total, expected);
            assert_eq!(draft.total, draft.counts.sum());
        }
    }

    #[test]
    fn test_all_regions_at_maximum() {
        let mut form = form();
        for region in BodyRegion::ALL {
            form.set_count(region, MAX_REGION_COUNT).unwrap();
        }
        assert_eq!(form.total(), 7 * MAX_REGION_COUNT);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let mut form = form();

        assert!(matches!(
            form.set_count(BodyRegion::Back, MAX_REGION_COUNT + 1),
            Err(NeedleError::OutOfRange { field: "back", .. })
        ));
        assert!(form
            .set_moxibustion_count(MAX_MOXIBUSTION_COUNT + 1)
            .is_err());
        assert!(form
            .set_electroacupuncture_pairs(MAX_ELECTROACUPUNCTURE_PAIRS + 1)
            .is_err());
        assert!(matches!(
            form.set_bed(BedId::new(21).unwrap()),
            Err(NeedleError::UnknownBed { bed_count: 20, .. })
        ));

        // Rejected values leave the form untouched.
        assert_eq!(form.total(), 0);
        assert_eq!(form.bed_id().number(), 1);
    }

    #[test]
    fn test_submit_carries_supplementary_fields() {
        let mut form = form();
        form.set_count(BodyRegion::Head, 3).unwrap();
        form.set_bed(BedId::new(5).unwrap()).unwrap();
        form.set_moxibustion_count(2).unwrap();
        form.set_cupping(true);
        form.set_electroacupuncture_pairs(1).unwrap();
        form.set_remarks("left shoulder");

        let (bed, draft) = form.submit(scanned_at());
        assert_eq!(bed.number(), 5);
        assert_eq!(draft.total, 3);
        assert_eq!(draft.scan_timestamp, scanned_at());
        assert_eq!(draft.moxibustion_count, 2);
        assert!(draft.cupping);
        assert_eq!(draft.electroacupuncture_pairs, 1);
        assert_eq!(draft.remarks, "left shoulder");
    }
}
