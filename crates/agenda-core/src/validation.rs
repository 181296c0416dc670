use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::appointment::Appointment;
use crate::ids::AppointmentId;
use crate::overlap::has_conflict;
use crate::policy::{BusinessHours, MinimumDuration};

/// Why a proposed appointment was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    PastStartTime,
    EndBeforeStart,
    BelowMinimumDuration,
    OutsideBusinessHours,
    OverlapsExistingAppointment,
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PastStartTime => "past_start_time",
            Self::EndBeforeStart => "end_before_start",
            Self::BelowMinimumDuration => "below_minimum_duration",
            Self::OutsideBusinessHours => "outside_business_hours",
            Self::OverlapsExistingAppointment => "overlaps_existing_appointment",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PastStartTime | Self::EndBeforeStart => "Invalid Date/Time",
            Self::BelowMinimumDuration => "Duration Error",
            Self::OutsideBusinessHours => "Business Hours Violation",
            Self::OverlapsExistingAppointment => "Overlap Error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::PastStartTime => "Cannot schedule appointments in the past.",
            Self::EndBeforeStart => "End time cannot be before start time.",
            Self::BelowMinimumDuration => "Appointment is shorter than the minimum duration.",
            Self::OutsideBusinessHours => "Appointment must be within business hours.",
            Self::OverlapsExistingAppointment => "This appointment overlaps with an existing one.",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(Rejection),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Accepted => None,
            Self::Rejected(r) => Some(*r),
        }
    }
}

/// Which form the candidate came from.
///
/// Only the edit path refuses a start in the past; creating an appointment
/// that already started is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFlow {
    Create,
    Edit {
        appointment_id: AppointmentId,
        now: DateTime<Utc>,
    },
}

impl ValidationFlow {
    pub fn excluded_id(&self) -> Option<AppointmentId> {
        match self {
            Self::Create => None,
            Self::Edit { appointment_id, .. } => Some(*appointment_id),
        }
    }
}

/// Runs the scheduling rules in a fixed order and stops at the first failure.
#[derive(Debug, Clone, Default)]
pub struct ScheduleValidator {
    business_hours: BusinessHours,
    min_duration: MinimumDuration,
}

impl ScheduleValidator {
    pub fn new(business_hours: BusinessHours, min_duration: MinimumDuration) -> Self {
        Self {
            business_hours,
            min_duration,
        }
    }

    /// `existing` is the customer's bookings as fetched right before this call.
    pub fn validate(
        &self,
        candidate: &Appointment,
        existing: &[Appointment],
        flow: ValidationFlow,
    ) -> ValidationOutcome {
        match self.first_failure(candidate, existing, flow) {
            Some(reason) => ValidationOutcome::Rejected(reason),
            None => ValidationOutcome::Accepted,
        }
    }

    fn first_failure(
        &self,
        candidate: &Appointment,
        existing: &[Appointment],
        flow: ValidationFlow,
    ) -> Option<Rejection> {
        let (start, end) = (candidate.start(), candidate.end());

        if let ValidationFlow::Edit { now, .. } = flow {
            if start < now {
                return Some(Rejection::PastStartTime);
            }
        }
        if end < start {
            return Some(Rejection::EndBeforeStart);
        }
        if !self.min_duration.is_met(start, end) {
            return Some(Rejection::BelowMinimumDuration);
        }
        if !self.business_hours.is_within(start, end) {
            return Some(Rejection::OutsideBusinessHours);
        }
        if has_conflict(candidate, existing, flow.excluded_id()) {
            return Some(Rejection::OverlapsExistingAppointment);
        }
        None
    }

    /// User-facing text for `rejection`, with this validator's limits filled in.
    pub fn explain(&self, rejection: Rejection) -> String {
        match rejection {
            Rejection::BelowMinimumDuration => format!(
                "Appointments must be at least {} minutes long.",
                self.min_duration.duration().num_minutes()
            ),
            Rejection::OutsideBusinessHours => format!(
                "Appointment must be between {} and {} ({}).",
                self.business_hours.opens().format("%H:%M"),
                self.business_hours.closes().format("%H:%M"),
                self.business_hours.zone().name()
            ),
            other => other.message().to_string(),
        }
    }

    pub fn business_hours(&self) -> &BusinessHours {
        &self.business_hours
    }

    pub fn min_duration(&self) -> MinimumDuration {
        self.min_duration
    }
}
