use chrono::{DateTime, Duration, Utc};

use crate::error::DomainError;

/// Shortest appointment the organization books.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumDuration(Duration);

impl MinimumDuration {
    pub fn new(min: Duration) -> Result<Self, DomainError> {
        if min <= Duration::zero() {
            return Err(DomainError::NonPositiveDuration);
        }
        Ok(Self(min))
    }

    pub fn minutes(minutes: i64) -> Result<Self, DomainError> {
        let min = Duration::try_minutes(minutes).ok_or(DomainError::DurationOutOfRange(minutes))?;
        Self::new(min)
    }

    pub fn is_met(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        end - start >= self.0
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl Default for MinimumDuration {
    fn default() -> Self {
        Self(Duration::minutes(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn exactly_fifteen_minutes_passes() {
        let min = MinimumDuration::default();
        assert!(min.is_met(ts("2024-06-10T13:00:00Z"), ts("2024-06-10T13:15:00Z")));
    }

    #[test]
    fn one_second_short_fails() {
        let min = MinimumDuration::default();
        assert!(!min.is_met(ts("2024-06-10T13:00:00Z"), ts("2024-06-10T13:14:59Z")));
    }

    #[test]
    fn inverted_interval_fails() {
        let min = MinimumDuration::default();
        assert!(!min.is_met(ts("2024-06-10T14:00:00Z"), ts("2024-06-10T13:00:00Z")));
    }

    #[test]
    fn zero_or_negative_minimum_rejected() {
        assert_eq!(
            MinimumDuration::minutes(0),
            Err(DomainError::NonPositiveDuration)
        );
        assert_eq!(
            MinimumDuration::minutes(-5),
            Err(DomainError::NonPositiveDuration)
        );
        assert_eq!(
            MinimumDuration::minutes(30).unwrap().duration(),
            Duration::minutes(30)
        );
    }

    #[test]
    fn unrepresentable_minimum_is_out_of_range() {
        assert_eq!(
            MinimumDuration::minutes(i64::MAX),
            Err(DomainError::DurationOutOfRange(i64::MAX))
        );
    }
}
