pub mod details;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AppointmentId, CustomerId};

pub use details::AppointmentDetails;

/// An appointment as the scheduling rules see it: who it belongs to and the
/// half-open UTC interval `[start, end)` it occupies.
///
/// A candidate built from form input has no id and may be inverted or empty;
/// it only reaches storage after validation, so every persisted appointment
/// satisfies `start < end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    id: Option<AppointmentId>,
    customer_id: CustomerId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    details: AppointmentDetails,
}

impl Appointment {
    /// A not-yet-persisted candidate.
    pub fn candidate(
        customer_id: CustomerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        details: AppointmentDetails,
    ) -> Self {
        Self {
            id: None,
            customer_id,
            start,
            end,
            details,
        }
    }

    /// An appointment loaded back from storage.
    pub fn restore(
        id: AppointmentId,
        customer_id: CustomerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        details: AppointmentDetails,
    ) -> Self {
        Self {
            id: Some(id),
            customer_id,
            start,
            end,
            details,
        }
    }

    /// Same appointment under a storage-assigned id.
    pub fn with_id(self, id: AppointmentId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    pub fn id(&self) -> Option<AppointmentId> {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn details(&self) -> &AppointmentDetails {
        &self.details
    }

    pub fn starts_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start >= from && self.start <= to
    }
}
