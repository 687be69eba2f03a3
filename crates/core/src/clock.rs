//! Time source for the bed data store.

use chrono::{DateTime, Utc};

/// Supplies the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock; clones share the same instant.
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct ManualClock(std::rc::Rc<std::cell::Cell<DateTime<Utc>>>);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn at(instant: DateTime<Utc>) -> Self {
        Self(std::rc::Rc::new(std::cell::Cell::new(instant)))
    }

    pub(crate) fn set(&self, instant: DateTime<Utc>) {
        self.0.set(instant);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}
