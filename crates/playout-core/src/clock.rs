// crates/playout-core/src/clock.rs
//
// Wall-clock access behind a trait so the iterator and input builder can be
// driven deterministically in tests.

use chrono::{Local, NaiveDate, Timelike};

pub trait Clock: Send + Sync {
    /// Seconds since local midnight, as a float (fractional seconds included).
    fn now_time_of_day(&self) -> f64;
    /// Unix timestamp, seconds.
    fn now_stamp(&self) -> i64;
    /// Today's local calendar date.
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_time_of_day(&self) -> f64 {
        let now = Local::now();
        let t = now.time();
        t.num_seconds_from_midnight() as f64 + t.nanosecond() as f64 / 1_000_000_000.0
    }

    fn now_stamp(&self) -> i64 {
        Local::now().timestamp()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// The playlist date for a given `day_start` offset (in seconds past midnight):
/// if the current time of day is before `day_start`, the "playlist day" is
/// still yesterday's.
pub fn playlist_date(clock: &dyn Clock, day_start: f64) -> NaiveDate {
    let today = clock.today();
    if clock.now_time_of_day() < day_start {
        today.pred_opt().unwrap_or(today)
    } else {
        today
    }
}

/// A clock fixed at construction time, for tests.
pub struct FixedClock {
    pub time_of_day: f64,
    pub stamp: i64,
    pub date: NaiveDate,
}

impl Clock for FixedClock {
    fn now_time_of_day(&self) -> f64 {
        self.time_of_day
    }
    fn now_stamp(&self) -> i64 {
        self.stamp
    }
    fn today(&self) -> NaiveDate {
        self.date
    }
}
