//! Conversion between wall-clock readings in a caller's zone and UTC instants.
//!
//! Every instant the domain stores or compares is a `DateTime<Utc>`. Wall-clock
//! values only exist at the edges: form input coming in, display going out, and
//! the business-hours check which reads the clock in its reference zone.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::DomainError;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub mod tz_serde {
    use chrono_tz::Tz;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Tz, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Tz>().map_err(serde::de::Error::custom)
    }
}

pub fn parse_zone(name: &str) -> Result<Tz, DomainError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| DomainError::UnknownTimeZone(name.to_string()))
}

/// Parses `HH:MM` (24-hour clock).
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| DomainError::InvalidTimeOfDay(raw.to_string()))
}

/// Builds a time of day from the hour and minute pickers of a form.
pub fn time_of_day(hour: u32, minute: u32) -> Result<NaiveTime, DomainError> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| DomainError::InvalidTimeOfDay(format!("{hour:02}:{minute:02}")))
}

/// Interprets `date` + `time` as a wall-clock reading in `zone`.
///
/// A reading that occurs twice (clocks falling back) resolves to the earlier
/// instant. A reading that never occurs (clocks springing forward) keeps the
/// offset in force before the transition, so it lands later by the length of
/// the gap: 02:30 on a spring-forward night in New York becomes 03:30 EDT.
pub fn to_utc(date: NaiveDate, time: NaiveTime, zone: Tz) -> DateTime<Utc> {
    let local = NaiveDateTime::new(date, time);
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            let before = zone
                .offset_from_utc_datetime(&(local - Duration::days(1)))
                .fix();
            let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}

/// Reads `instant` on the wall clock of `zone`.
pub fn to_zone(instant: DateTime<Utc>, zone: Tz) -> (NaiveDate, NaiveTime) {
    let local = instant.with_timezone(&zone);
    (local.date_naive(), local.time())
}

/// Renders `instant` as `yyyy-MM-dd HH:mm:ss` on the wall clock of `zone`.
pub fn format_local(instant: DateTime<Utc>, zone: Tz) -> String {
    instant.with_timezone(&zone).format(DISPLAY_FORMAT).to_string()
}
