use chrono::NaiveDate;

use agenda_core::ids::{AppointmentId, ContactId, CustomerId, UserId};
use agenda_core::validation::Rejection;

use crate::error::FormError;

/// What the appointment form submits, before time-zone conversion and
/// scheduling rules.
#[derive(Debug, Clone)]
pub struct AppointmentForm {
    pub title: String,
    pub description: String,
    pub location: String,
    pub kind: String,
    pub start_date: NaiveDate,
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_date: NaiveDate,
    pub end_hour: u32,
    pub end_minute: u32,
    pub customer_id: CustomerId,
    pub user_id: UserId,
    pub contact_id: ContactId,
}

impl AppointmentForm {
    /// Every free-text field must hold something other than whitespace.
    pub fn check_complete(&self) -> Result<(), FormError> {
        let fields = [
            ("title", &self.title),
            ("description", &self.description),
            ("location", &self.location),
            ("type", &self.kind),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(FormError::MissingField(*name)),
            None => Ok(()),
        }
    }
}

/// Result of a create or edit attempt that reached the scheduling rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(AppointmentId),
    Rejected(Rejection),
}
