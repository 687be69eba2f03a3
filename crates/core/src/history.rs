//! Read-time filtering of the history log.
//!
//! The log is never partitioned by day on disk. The history view asks for the records of one
//! calendar day in the viewer's time zone and everything else stays in the log untouched.

use crate::record::NeedleRecord;
use chrono::{DateTime, Local, TimeZone};

/// Records scanned on the same calendar day as `now`, in `now`'s time zone.
///
/// The newest-first order of `history` is preserved.
pub fn records_on_day<'a, Tz: TimeZone>(
    history: &'a [NeedleRecord],
    now: &DateTime<Tz>,
) -> Vec<&'a NeedleRecord> {
    let zone = now.timezone();
    let day = now.date_naive();

    history
        .iter()
        .filter(|record| record.scan_timestamp.with_timezone(&zone).date_naive() == day)
        .collect()
}

/// Records scanned today in the local time zone.
pub fn todays_records(history: &[NeedleRecord]) -> Vec<&NeedleRecord> {
    records_on_day(history, &Local::now())
}
