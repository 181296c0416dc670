use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),
    #[error("invalid time of day: {0}")]
    InvalidTimeOfDay(String),
    #[error("business hours must open before they close")]
    InvalidBusinessHours,
    #[error("duration must be positive")]
    NonPositiveDuration,
    #[error("duration of {0} minutes is out of range")]
    DurationOutOfRange(i64),
}
