//! Navigable views addressed by route string.
//!
//! Routes follow the hash-router shape `/`, `/bed/<n>` and `/history`. A leading `#` is
//! accepted so links copied from a browser bookmark keep working.

use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::history::records_on_day;
use crate::store::BedDataStore;
use crate::views::{BedView, HistoryView, HomeView, InvalidBedView};
use crate::{NeedleError, NeedleResult};
use chrono::{DateTime, TimeZone};
use needle_types::BedId;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    /// `None` when the route carries no usable bed identifier.
    Bed(Option<BedId>),
    History,
}

impl Route {
    /// Renders the view this route addresses.
    ///
    /// Bed routes outside the configured range render the invalid-bed message rather than
    /// failing, unless the bed still holds a record. The history view shows the records of `now`'s calendar day and all times are
    /// shown in `now`'s zone.
    pub fn render<C, Tz>(
        &self,
        store: &BedDataStore<C>,
        config: &CoreConfig,
        now: &DateTime<Tz>,
    ) -> String
    where
        C: Clock,
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self {
            Route::Home => HomeView::new(config, store.beds()).to_string(),
            Route::Bed(Some(bed)) if store.is_addressable(config, *bed) => {
                BedView::new(*bed, store.bed(*bed), now.timezone()).to_string()
            }
            Route::Bed(_) => InvalidBedView.to_string(),
            Route::History => {
                HistoryView::new(records_on_day(store.history(), now), now.timezone()).to_string()
            }
        }
    }
}

impl FromStr for Route {
    type Err = NeedleError;

    fn from_str(s: &str) -> NeedleResult<Self> {
        let path = s.trim().trim_start_matches('#');
        let path = path.trim_end_matches('/');

        match path {
            "" => Ok(Route::Home),
            "/history" => Ok(Route::History),
            "/bed" => Ok(Route::Bed(None)),
            _ => match path.strip_prefix("/bed/") {
                Some(id) => Ok(Route::Bed(id.parse().ok())),
                None => Err(NeedleError::UnknownRoute(s.to_owned())),
            },
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Bed(Some(bed)) => write!(f, "/bed/{}", bed),
            Route::Bed(None) => write!(f, "/bed/"),
            Route::History => write!(f, "/history"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::record::RecordDraft;
    use chrono::{Duration, Utc};
    use needle_storage::LocalStore;
    use needle_types::{BodyRegion, NeedleCounts, PatientId};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn bed(n: u16) -> BedId {
        BedId::new(n).unwrap()
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!("/".parse::<Route>().unwrap(), Route::Home);
        assert_eq!("".parse::<Route>().unwrap(), Route::Home);
        assert_eq!("#/".parse::<Route>().unwrap(), Route::Home);
        assert_eq!("/history".parse::<Route>().unwrap(), Route::History);
        assert_eq!("#/history/".parse::<Route>().unwrap(), Route::History);
        assert_eq!("/bed/5".parse::<Route>().unwrap(), Route::Bed(Some(bed(5))));
        assert_eq!("#/bed/12".parse::<Route>().unwrap(), Route::Bed(Some(bed(12))));
    }

    #[test]
    fn test_parse_bed_route_without_usable_id() {
        assert_eq!("/bed/".parse::<Route>().unwrap(), Route::Bed(None));
        assert_eq!("/bed".parse::<Route>().unwrap(), Route::Bed(None));
        assert_eq!("/bed/abc".parse::<Route>().unwrap(), Route::Bed(None));
        assert_eq!("/bed/0".parse::<Route>().unwrap(), Route::Bed(None));
    }

    #[test]
    fn test_parse_unknown_route() {
        assert!(matches!(
            "/settings".parse::<Route>(),
            Err(NeedleError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for route in [Route::Home, Route::History, Route::Bed(Some(bed(3))), Route::Bed(None)] {
            assert_eq!(route.to_string().parse::<Route>().unwrap(), route);
        }
    }

    #[test]
    fn test_render_each_route() {
        let temp = TempDir::new().unwrap();
        let now = Utc::now();
        let clock = ManualClock::at(now);
        let config = CoreConfig::new(PathBuf::from("unused"), 20).unwrap();
        let mut store = BedDataStore::load(LocalStore::open(temp.path()), clock);

        let mut counts = NeedleCounts::default();
        counts.set(BodyRegion::Head, 3);
        store.update_bed_data(
            bed(5),
            RecordDraft {
                patient_id: PatientId::new("P001").unwrap(),
                counts,
                total: 3,
                scan_timestamp: now,
                moxibustion_count: 0,
                cupping: false,
                electroacupuncture_pairs: 0,
                remarks: String::new(),
            },
        );

        let home = Route::Home.render(&store, &config, &now);
        assert!(home.contains("[ 5] P001"));

        let bed_view = Route::Bed(Some(bed(5))).render(&store, &config, &now);
        assert!(bed_view.contains("Total needles: 3"));

        let empty = Route::Bed(Some(bed(6))).render(&store, &config, &now);
        assert!(empty.ends_with("No patient"));

        let out_of_range = Route::Bed(Some(bed(21))).render(&store, &config, &now);
        assert_eq!(out_of_range, "Invalid bed");
        assert_eq!(Route::Bed(None).render(&store, &config, &now), "Invalid bed");

        let smaller = CoreConfig::new(PathBuf::from("unused"), 4).unwrap();
        let stranded = Route::Bed(Some(bed(5))).render(&store, &smaller, &now);
        assert!(stranded.starts_with("Bed 5\nPatient: P001"));
        assert_eq!(
            Route::Bed(Some(bed(6))).render(&store, &smaller, &now),
            "Invalid bed"
        );

        let history = Route::History.render(&store, &config, &now);
        assert!(history.contains("Patient P001 | Bed 5"));

        let next_week = now + Duration::days(7);
        let later = Route::History.render(&store, &config, &next_week);
        assert!(later.contains("No records today"));
    }
}
