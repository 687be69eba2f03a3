//! Text views over the bed data store.
//!
//! Each view borrows what it shows and renders through `Display`, so the caller decides where
//! the text goes. Times are shown as `HH:MM` in the zone the view was built with.

use crate::config::CoreConfig;
use crate::record::NeedleRecord;
use crate::store::BedMap;
use chrono::{DateTime, TimeZone, Utc};
use needle_types::BedId;
use std::fmt;

const TITLE: &str = "Acupuncture Needle Counter";

/// Home menu: bed overview and the available actions.
pub struct HomeView<'a> {
    config: &'a CoreConfig,
    beds: &'a BedMap,
}

impl<'a> HomeView<'a> {
    pub fn new(config: &'a CoreConfig, beds: &'a BedMap) -> Self {
        Self { config, beds }
    }
}

impl fmt::Display for HomeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", TITLE)?;
        writeln!(f, "{}", "=".repeat(TITLE.len()))?;
        writeln!(f, "Beds:")?;
        for bed in self.config.bed_ids() {
            match self.beds.get(&bed).and_then(Option::as_ref) {
                Some(record) => write_bed_line(f, bed, record)?,
                None => writeln!(f, "  [{:>2}] -", bed)?,
            }
        }

        // Occupied beds left over from a larger bed count.
        let mut stranded = self
            .beds
            .iter()
            .filter(|(bed, _)| !self.config.contains_bed(**bed))
            .filter_map(|(bed, record)| record.as_ref().map(|r| (*bed, r)))
            .peekable();
        if stranded.peek().is_some() {
            writeln!(f, "Outside configured beds:")?;
            for (bed, record) in stranded {
                write_bed_line(f, bed, record)?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Menu:")?;
        writeln!(f, "  Start scanning")?;
        writeln!(f, "  History        /history")?;
        write!(f, "  Bed display    /bed/<n>")
    }
}

/// Display for a single bed, occupied or empty.
pub struct BedView<'a, Tz: TimeZone> {
    bed_id: BedId,
    record: Option<&'a NeedleRecord>,
    zone: Tz,
}

impl<'a, Tz: TimeZone> BedView<'a, Tz> {
    pub fn new(bed_id: BedId, record: Option<&'a NeedleRecord>, zone: Tz) -> Self {
        Self {
            bed_id,
            record,
            zone,
        }
    }
}

impl<Tz> fmt::Display for BedView<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(record) = self.record else {
            writeln!(f, "Bed {}", self.bed_id)?;
            return write!(f, "No patient");
        };

        writeln!(f, "Bed {}", self.bed_id)?;
        writeln!(f, "Patient: {}", record.patient_id)?;
        writeln!(
            f,
            "Scan: {}   Needling: {}   Removal: {}",
            clock_time(Some(record.scan_timestamp), &self.zone, "---"),
            clock_time(record.acupuncture_timestamp, &self.zone, "---"),
            clock_time(record.removal_timestamp, &self.zone, "---"),
        )?;
        writeln!(f)?;

        for (region, count) in record.counts.iter() {
            writeln!(f, "  {:<18} {:>3}", region.label(), count)?;
        }

        if record.has_additional_items() {
            writeln!(f)?;
            writeln!(f, "Additional items")?;
            writeln!(f, "  Cupping: {}", yes_no(record.cupping))?;
            writeln!(f, "  Moxibustion: {}", record.moxibustion_count)?;
            writeln!(
                f,
                "  Electroacupuncture pairs: {}",
                record.electroacupuncture_pairs
            )?;
            if !record.remarks.trim().is_empty() {
                writeln!(f, "  Remarks:")?;
                for line in record.remarks.lines() {
                    writeln!(f, "    {}", line)?;
                }
            }
        }

        writeln!(f)?;
        write!(f, "Total needles: {}", record.total)
    }
}

/// Inline message for a bed route without a usable bed identifier.
pub struct InvalidBedView;

impl fmt::Display for InvalidBedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid bed")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryScope {
    Today,
    FullLog,
}

/// Treatment records as cards, newest first.
pub struct HistoryView<'a, Tz: TimeZone> {
    records: Vec<&'a NeedleRecord>,
    zone: Tz,
    scope: HistoryScope,
}

impl<'a, Tz: TimeZone> HistoryView<'a, Tz> {
    /// View over the records of one day, as selected by [`crate::history::records_on_day`].
    pub fn new(records: Vec<&'a NeedleRecord>, zone: Tz) -> Self {
        Self {
            records,
            zone,
            scope: HistoryScope::Today,
        }
    }

    /// View over the whole history log.
    pub fn full_log(records: &'a [NeedleRecord], zone: Tz) -> Self {
        Self {
            records: records.iter().collect(),
            zone,
            scope: HistoryScope::FullLog,
        }
    }
}

impl<Tz> fmt::Display for HistoryView<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (heading, empty) = match self.scope {
            HistoryScope::Today => ("Today's treatment records", "No records today"),
            HistoryScope::FullLog => ("All treatment records", "No records yet"),
        };
        writeln!(f, "{}", heading)?;
        writeln!(f, "{}", "-".repeat(heading.len()))?;

        if self.records.is_empty() {
            writeln!(f, "{}", empty)?;
            return write!(f, "Completed intake records will appear here.");
        }

        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            self.write_card(f, record)?;
        }
        Ok(())
    }
}

impl<Tz> HistoryView<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn write_card(&self, f: &mut fmt::Formatter<'_>, record: &NeedleRecord) -> fmt::Result {
        writeln!(
            f,
            "Patient {} | Bed {} | Scan {} | Total {}",
            record.patient_id,
            record.bed_id,
            clock_time(Some(record.scan_timestamp), &self.zone, "N/A"),
            record.total
        )?;
        writeln!(
            f,
            "  Times: scan {}, needling {}, removal {}",
            clock_time(Some(record.scan_timestamp), &self.zone, "N/A"),
            clock_time(record.acupuncture_timestamp, &self.zone, "N/A"),
            clock_time(record.removal_timestamp, &self.zone, "N/A"),
        )?;

        let needled: Vec<String> = record
            .counts
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(region, count)| format!("{} {}", region.label(), count))
            .collect();
        if needled.is_empty() {
            writeln!(f, "  Needles: none recorded")?;
        } else {
            writeln!(f, "  Needles: {}", needled.join(", "))?;
        }

        write!(
            f,
            "  Additional: cupping {}, moxibustion {}, electroacupuncture {}",
            yes_no(record.cupping),
            record.moxibustion_count,
            record.electroacupuncture_pairs
        )?;

        if !record.remarks.is_empty() {
            writeln!(f)?;
            write!(f, "  Remarks: {}", record.remarks)?;
        }
        writeln!(f)
    }
}

/// Confirmation shown after a successful intake.
pub struct SavedView {
    bed_id: BedId,
}

impl SavedView {
    pub fn new(bed_id: BedId) -> Self {
        Self { bed_id }
    }
}

impl fmt::Display for SavedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Record saved")?;
        write!(f, "Data sent to bed {}", self.bed_id)
    }
}

fn clock_time<Tz>(instant: Option<DateTime<Utc>>, zone: &Tz, missing: &'static str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match instant {
        Some(t) => t.with_timezone(zone).format("%H:%M").to_string(),
        None => missing.to_string(),
    }
}

fn write_bed_line(f: &mut fmt::Formatter<'_>, bed: BedId, record: &NeedleRecord) -> fmt::Result {
    writeln!(
        f,
        "  [{:>2}] {:<16} {:>3} needles",
        bed, record.patient_id, record.total
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
