//! Week, month and day views of the appointment book.
//!
//! A view covers whole days on the caller's wall clock and is stored as the
//! half-open UTC interval between the first local midnight it includes and
//! the first one it does not.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::appointment::Appointment;
use crate::time::to_utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ViewRange {
    pub fn days(first: NaiveDate, count: i64, zone: Tz) -> Self {
        Self {
            start: to_utc(first, NaiveTime::MIN, zone),
            end: to_utc(first + Duration::days(count), NaiveTime::MIN, zone),
        }
    }

    pub fn day_of(date: NaiveDate, zone: Tz) -> Self {
        Self::days(date, 1, zone)
    }

    /// Monday through Sunday containing `date`.
    pub fn week_of(date: NaiveDate, zone: Tz) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        Self::days(monday, 7, zone)
    }

    pub fn month_of(date: NaiveDate, zone: Tz) -> Self {
        let first = date - Duration::days(i64::from(date.day0()));
        // 31 days past the 1st always lands in the following month.
        let probe = first + Duration::days(31);
        let next = probe - Duration::days(i64::from(probe.day0()));
        Self {
            start: to_utc(first, NaiveTime::MIN, zone),
            end: to_utc(next, NaiveTime::MIN, zone),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Appointments starting inside the view, in start order.
    pub fn select(&self, appointments: &[Appointment]) -> Vec<Appointment> {
        let mut hits: Vec<Appointment> = appointments
            .iter()
            .filter(|a| self.contains(a.start()))
            .cloned()
            .collect();
        hits.sort_by_key(|a| (a.start(), a.id()));
        hits
    }
}
