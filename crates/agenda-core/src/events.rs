use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::{AppointmentId, CustomerId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DomainEvent {
    AppointmentCreated(AppointmentCreated),
    AppointmentUpdated(AppointmentUpdated),
    AppointmentDeleted(AppointmentDeleted),
    CustomerAppointmentsPurged(CustomerAppointmentsPurged),
}

impl DomainEvent {
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::AppointmentCreated(e) => e.occurred_at,
            Self::AppointmentUpdated(e) => e.occurred_at,
            Self::AppointmentDeleted(e) => e.occurred_at,
            Self::CustomerAppointmentsPurged(e) => e.occurred_at,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AppointmentCreated(_) => "appointment.created",
            Self::AppointmentUpdated(_) => "appointment.updated",
            Self::AppointmentDeleted(_) => "appointment.deleted",
            Self::CustomerAppointmentsPurged(_) => "appointment.customer_purged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentCreated {
    pub appointment_id: AppointmentId,
    pub customer_id: CustomerId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentUpdated {
    pub appointment_id: AppointmentId,
    pub customer_id: CustomerId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentDeleted {
    pub appointment_id: AppointmentId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerAppointmentsPurged {
    pub customer_id: CustomerId,
    pub removed: u64,
    pub occurred_at: DateTime<Utc>,
}
