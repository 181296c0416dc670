use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use agenda_core::appointment::{Appointment, AppointmentDetails};
use agenda_core::calendar::ViewRange;
use agenda_core::error::DomainError;
use agenda_core::events::{
    AppointmentCreated, AppointmentDeleted, AppointmentUpdated, CustomerAppointmentsPurged,
    DomainEvent,
};
use agenda_core::ids::{AppointmentId, ContactId, CustomerId};
use agenda_core::report;
use agenda_core::time::{time_of_day, to_utc, to_zone};
use agenda_core::upcoming::{UpcomingAppointment, UpcomingAppointmentFinder};
use agenda_core::validation::{Rejection, ScheduleValidator, ValidationFlow, ValidationOutcome};
use agenda_ports::error::PortError;
use agenda_ports::inbound::AppointmentBook;
use agenda_ports::outbound::{AppointmentRepository, EventPublisher};
use agenda_ports::types::{AppointmentForm, SaveOutcome};

use crate::error::AppError;

pub struct AppointmentService<R, EP>
where
    R: AppointmentRepository,
    EP: EventPublisher,
{
    appointments: R,
    events: EP,
    validator: ScheduleValidator,
    finder: UpcomingAppointmentFinder,
}

impl<R, EP> AppointmentService<R, EP>
where
    R: AppointmentRepository,
    EP: EventPublisher,
{
    pub fn new(
        appointments: R,
        events: EP,
        validator: ScheduleValidator,
        finder: UpcomingAppointmentFinder,
    ) -> Self {
        Self {
            appointments,
            events,
            validator,
            finder,
        }
    }

    async fn check(
        &self,
        candidate: &Appointment,
        flow: ValidationFlow,
    ) -> Result<ValidationOutcome, AppError> {
        // Fresh snapshot for every attempt; the store re-checks overlap on write.
        let existing = self
            .appointments
            .find_for_customer(candidate.customer_id())
            .await?;
        let outcome = self.validator.validate(candidate, &existing, flow);
        if let ValidationOutcome::Rejected(reason) = outcome {
            tracing::info!(
                customer_id = %candidate.customer_id(),
                reason = %reason,
                detail = %self.validator.explain(reason),
                "appointment rejected"
            );
        }
        Ok(outcome)
    }

    async fn in_range(&self, range: &ViewRange) -> Result<Vec<Appointment>, AppError> {
        let fetched = self
            .appointments
            .find_starting_between(range.start(), range.end())
            .await?;
        Ok(range.select(&fetched))
    }
}

fn candidate_from_form(form: &AppointmentForm, zone: Tz) -> Result<Appointment, DomainError> {
    let start_time = time_of_day(form.start_hour, form.start_minute)?;
    let end_time = time_of_day(form.end_hour, form.end_minute)?;
    let start = to_utc(form.start_date, start_time, zone);
    let end = to_utc(form.end_date, end_time, zone);

    Ok(Appointment::candidate(
        form.customer_id,
        start,
        end,
        AppointmentDetails {
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
            location: form.location.trim().to_string(),
            kind: form.kind.trim().to_string(),
            contact_id: Some(form.contact_id),
            user_id: Some(form.user_id),
        },
    ))
}

#[async_trait]
impl<R, EP> AppointmentBook for AppointmentService<R, EP>
where
    R: AppointmentRepository,
    EP: EventPublisher,
{
    type Error = AppError;

    async fn create(
        &self,
        form: AppointmentForm,
        zone: Tz,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, AppError> {
        form.check_complete()?;
        let candidate = candidate_from_form(&form, zone)?;

        if let ValidationOutcome::Rejected(reason) =
            self.check(&candidate, ValidationFlow::Create).await?
        {
            return Ok(SaveOutcome::Rejected(reason));
        }

        let id = match self.appointments.insert(&candidate).await {
            Ok(id) => id,
            Err(PortError::Conflict) => {
                tracing::warn!(
                    customer_id = %candidate.customer_id(),
                    "overlapping appointment stored concurrently"
                );
                return Ok(SaveOutcome::Rejected(
                    Rejection::OverlapsExistingAppointment,
                ));
            }
            Err(e) => return Err(e.into()),
        };

        self.events
            .publish(vec![DomainEvent::AppointmentCreated(AppointmentCreated {
                appointment_id: id,
                customer_id: candidate.customer_id(),
                start: candidate.start(),
                end: candidate.end(),
                occurred_at: now,
            })])
            .await?;

        tracing::info!(
            appointment_id = %id,
            customer_id = %candidate.customer_id(),
            "appointment created"
        );
        Ok(SaveOutcome::Saved(id))
    }

    async fn edit(
        &self,
        id: AppointmentId,
        form: AppointmentForm,
        zone: Tz,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, AppError> {
        form.check_complete()?;
        self.appointments
            .find_by_id(id)
            .await?
            .ok_or(AppError::Port(PortError::NotFound))?;

        let candidate = candidate_from_form(&form, zone)?.with_id(id);
        let flow = ValidationFlow::Edit {
            appointment_id: id,
            now,
        };
        if let ValidationOutcome::Rejected(reason) = self.check(&candidate, flow).await? {
            return Ok(SaveOutcome::Rejected(reason));
        }

        match self.appointments.update(&candidate).await {
            Ok(()) => {}
            Err(PortError::Conflict) => {
                tracing::warn!(
                    appointment_id = %id,
                    "overlapping appointment stored concurrently"
                );
                return Ok(SaveOutcome::Rejected(
                    Rejection::OverlapsExistingAppointment,
                ));
            }
            Err(e) => return Err(e.into()),
        }

        self.events
            .publish(vec![DomainEvent::AppointmentUpdated(AppointmentUpdated {
                appointment_id: id,
                customer_id: candidate.customer_id(),
                start: candidate.start(),
                end: candidate.end(),
                occurred_at: now,
            })])
            .await?;

        tracing::info!(appointment_id = %id, "appointment updated");
        Ok(SaveOutcome::Saved(id))
    }

    async fn delete(&self, id: AppointmentId, now: DateTime<Utc>) -> Result<(), AppError> {
        self.appointments.delete(id).await?;
        self.events
            .publish(vec![DomainEvent::AppointmentDeleted(AppointmentDeleted {
                appointment_id: id,
                occurred_at: now,
            })])
            .await?;
        tracing::info!(appointment_id = %id, "appointment deleted");
        Ok(())
    }

    async fn delete_for_customer(
        &self,
        customer: CustomerId,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let removed = self.appointments.delete_for_customer(customer).await?;
        if removed > 0 {
            self.events
                .publish(vec![DomainEvent::CustomerAppointmentsPurged(
                    CustomerAppointmentsPurged {
                        customer_id: customer,
                        removed,
                        occurred_at: now,
                    },
                )])
                .await?;
        }
        tracing::info!(customer_id = %customer, removed, "customer appointments removed");
        Ok(removed)
    }

    async fn upcoming(
        &self,
        now: DateTime<Utc>,
        zone: Tz,
    ) -> Result<Option<UpcomingAppointment>, AppError> {
        let (from, to) = self.finder.window(now);
        let candidates = self.appointments.find_starting_between(from, to).await?;
        let found = self.finder.find(now, zone, &candidates);
        if let Some(hit) = &found {
            tracing::debug!(
                appointment_id = ?hit.appointment.id(),
                local_start = %hit.local_start,
                "upcoming appointment"
            );
        }
        Ok(found)
    }

    async fn week_view(&self, date: NaiveDate, zone: Tz) -> Result<Vec<Appointment>, AppError> {
        self.in_range(&ViewRange::week_of(date, zone)).await
    }

    async fn month_view(&self, date: NaiveDate, zone: Tz) -> Result<Vec<Appointment>, AppError> {
        self.in_range(&ViewRange::month_of(date, zone)).await
    }

    async fn kind_counts_for_month(
        &self,
        date: NaiveDate,
        zone: Tz,
    ) -> Result<BTreeMap<String, usize>, AppError> {
        let range = ViewRange::month_of(date, zone);
        let month = self.in_range(&range).await?;
        Ok(report::count_by_kind(&month, &range))
    }

    async fn tomorrow_count(&self, now: DateTime<Utc>, zone: Tz) -> Result<usize, AppError> {
        let (today, _) = to_zone(now, zone);
        let range = ViewRange::day_of(today + Duration::days(1), zone);
        let day = self.in_range(&range).await?;
        Ok(report::count_starting_in(&day, &range))
    }

    async fn kinds(&self) -> Result<Vec<String>, AppError> {
        Ok(self.appointments.list_kinds().await?)
    }

    async fn for_contact(&self, contact: ContactId) -> Result<Vec<Appointment>, AppError> {
        Ok(self.appointments.find_by_contact(contact).await?)
    }
}
