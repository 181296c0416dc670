//! Conflict detection between a candidate and a customer's existing bookings.
//!
//! Intervals are half-open: `[a, b)` and `[b, c)` touch but do not overlap.

use chrono::{DateTime, Utc};

use crate::appointment::Appointment;
use crate::ids::AppointmentId;

pub fn intervals_overlap(
    start_a: DateTime<Utc>,
    end_a: DateTime<Utc>,
    start_b: DateTime<Utc>,
    end_b: DateTime<Utc>,
) -> bool {
    start_a < end_b && end_a > start_b
}

/// True when `candidate` overlaps any appointment of the same customer in
/// `existing`. The entry whose id equals `exclude` is skipped before any
/// other comparison, so an appointment being moved never collides with its
/// own previous slot.
pub fn has_conflict(
    candidate: &Appointment,
    existing: &[Appointment],
    exclude: Option<AppointmentId>,
) -> bool {
    find_conflict(candidate, existing, exclude).is_some()
}

/// The first conflicting appointment, if any.
pub fn find_conflict<'a>(
    candidate: &Appointment,
    existing: &'a [Appointment],
    exclude: Option<AppointmentId>,
) -> Option<&'a Appointment> {
    existing
        .iter()
        .filter(|other| exclude.is_none() || other.id() != exclude)
        .find(|other| {
            other.customer_id() == candidate.customer_id()
                && intervals_overlap(candidate.start(), candidate.end(), other.start(), other.end())
        })
}
