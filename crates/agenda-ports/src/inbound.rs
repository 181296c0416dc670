use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use agenda_core::appointment::Appointment;
use agenda_core::ids::{AppointmentId, ContactId, CustomerId};
use agenda_core::upcoming::UpcomingAppointment;

use crate::types::{AppointmentForm, SaveOutcome};

/// What the form and screen layer can ask of the appointment book. `zone` is
/// always the caller's own time zone.
#[async_trait]
pub trait AppointmentBook: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn create(
        &self,
        form: AppointmentForm,
        zone: Tz,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, Self::Error>;
    async fn edit(
        &self,
        id: AppointmentId,
        form: AppointmentForm,
        zone: Tz,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, Self::Error>;
    async fn delete(&self, id: AppointmentId, now: DateTime<Utc>) -> Result<(), Self::Error>;
    async fn delete_for_customer(
        &self,
        customer: CustomerId,
        now: DateTime<Utc>,
    ) -> Result<u64, Self::Error>;
    async fn upcoming(
        &self,
        now: DateTime<Utc>,
        zone: Tz,
    ) -> Result<Option<UpcomingAppointment>, Self::Error>;
    async fn week_view(&self, date: NaiveDate, zone: Tz) -> Result<Vec<Appointment>, Self::Error>;
    async fn month_view(&self, date: NaiveDate, zone: Tz)
        -> Result<Vec<Appointment>, Self::Error>;
    async fn kind_counts_for_month(
        &self,
        date: NaiveDate,
        zone: Tz,
    ) -> Result<BTreeMap<String, usize>, Self::Error>;
    async fn tomorrow_count(&self, now: DateTime<Utc>, zone: Tz) -> Result<usize, Self::Error>;
    async fn kinds(&self) -> Result<Vec<String>, Self::Error>;
    async fn for_contact(&self, contact: ContactId) -> Result<Vec<Appointment>, Self::Error>;
}
