use async_trait::async_trait;
use chrono::{DateTime, Utc};

use agenda_core::appointment::Appointment;
use agenda_core::events::DomainEvent;
use agenda_core::ids::{AppointmentId, ContactId, CustomerId};

use crate::error::PortError;

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>, PortError>;
    async fn find_for_customer(&self, customer: CustomerId)
        -> Result<Vec<Appointment>, PortError>;
    /// Appointments with `from <= start <= to`, earliest start first.
    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, PortError>;
    async fn find_by_contact(&self, contact: ContactId) -> Result<Vec<Appointment>, PortError>;
    async fn list_kinds(&self) -> Result<Vec<String>, PortError>;
    /// Fails with `PortError::Conflict` if a booking of the same customer
    /// overlapping the candidate was stored in the meantime.
    async fn insert(&self, appointment: &Appointment) -> Result<AppointmentId, PortError>;
    async fn update(&self, appointment: &Appointment) -> Result<(), PortError>;
    async fn delete(&self, id: AppointmentId) -> Result<(), PortError>;
    async fn delete_for_customer(&self, customer: CustomerId) -> Result<u64, PortError>;
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), PortError>;
}
