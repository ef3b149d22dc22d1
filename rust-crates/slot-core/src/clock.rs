use chrono::{
    DateTime,
    Local,
    NaiveDate,
    Utc,
};
use std::sync::{
    Arc,
    Mutex,
};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day used for daily spending, in the local time zone.
    fn today(&self) -> NaiveDate;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for tests. Clones share the same instant; `today` is the
/// UTC date of that instant.
#[derive(Clone, Debug)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
