use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::appointment::Appointment;
use crate::error::DomainError;

/// An appointment about to begin, with its start read on the caller's clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingAppointment {
    pub appointment: Appointment,
    pub local_start: DateTime<Tz>,
}

/// Picks the appointment that should raise the "starting soon" alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingAppointmentFinder {
    lookahead: Duration,
}

impl UpcomingAppointmentFinder {
    pub fn new(lookahead: Duration) -> Result<Self, DomainError> {
        if lookahead <= Duration::zero() {
            return Err(DomainError::NonPositiveDuration);
        }
        Ok(Self { lookahead })
    }

    pub fn minutes(minutes: i64) -> Result<Self, DomainError> {
        let lookahead =
            Duration::try_minutes(minutes).ok_or(DomainError::DurationOutOfRange(minutes))?;
        Self::new(lookahead)
    }

    /// Closed window `[now, now + lookahead]`, clamped to the last representable
    /// instant.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let to = now
            .checked_add_signed(self.lookahead)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (now, to)
    }

    /// Earliest start inside the window across all of `appointments`; equal
    /// starts go to the lowest id.
    pub fn find(
        &self,
        now: DateTime<Utc>,
        zone: Tz,
        appointments: &[Appointment],
    ) -> Option<UpcomingAppointment> {
        let (from, to) = self.window(now);
        appointments
            .iter()
            .filter(|a| a.starts_within(from, to))
            .min_by_key(|a| (a.start(), a.id()))
            .map(|a| UpcomingAppointment {
                appointment: a.clone(),
                local_start: a.start().with_timezone(&zone),
            })
    }

    pub fn lookahead(&self) -> Duration {
        self.lookahead
    }
}

impl Default for UpcomingAppointmentFinder {
    fn default() -> Self {
        Self {
            lookahead: Duration::minutes(15),
        }
    }
}
