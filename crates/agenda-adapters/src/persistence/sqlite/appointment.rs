use async_trait::async_trait;
use chrono::{DateTime, Utc};

use agenda_core::appointment::{Appointment, AppointmentDetails};
use agenda_core::ids::{AppointmentId, ContactId, CustomerId};
use agenda_ports::error::PortError;
use agenda_ports::outbound::AppointmentRepository;

use super::{instant_from_text, instant_to_text, SqliteDb};

type AppointmentRow = (i64, i64, String, String, String);

const SELECT_COLUMNS: &str = "SELECT id, customer_id, start_utc, end_utc, data FROM appointments";

fn from_row((id, customer_id, start, end, data): AppointmentRow) -> Result<Appointment, PortError> {
    let details: AppointmentDetails =
        serde_json::from_str(&data).map_err(|e| PortError::Persistence(e.to_string()))?;
    Ok(Appointment::restore(
        AppointmentId::new(id),
        CustomerId::new(customer_id),
        instant_from_text(&start)?,
        instant_from_text(&end)?,
        details,
    ))
}

fn from_rows(rows: Vec<AppointmentRow>) -> Result<Vec<Appointment>, PortError> {
    rows.into_iter().map(from_row).collect()
}

/// Column values shared by insert and update.
struct Columns {
    customer_id: i64,
    contact_id: Option<i64>,
    user_id: Option<i64>,
    kind: String,
    start: String,
    end: String,
    data: String,
}

impl Columns {
    fn of(appointment: &Appointment) -> Result<Self, PortError> {
        let details = appointment.details();
        Ok(Self {
            customer_id: appointment.customer_id().value(),
            contact_id: details.contact_id.map(|c| c.value()),
            user_id: details.user_id.map(|u| u.value()),
            kind: details.kind.clone(),
            start: instant_to_text(appointment.start()),
            end: instant_to_text(appointment.end()),
            data: serde_json::to_string(details)
                .map_err(|e| PortError::Persistence(e.to_string()))?,
        })
    }
}

#[async_trait]
impl AppointmentRepository for SqliteDb {
    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>, PortError> {
        let row: Option<AppointmentRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PortError::Persistence(e.to_string()))?;

        row.map(from_row).transpose()
    }

    async fn find_for_customer(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<Appointment>, PortError> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE customer_id = ? ORDER BY start_utc, id"
        ))
        .bind(customer.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        from_rows(rows)
    }

    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, PortError> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE start_utc >= ? AND start_utc <= ? ORDER BY start_utc, id"
        ))
        .bind(instant_to_text(from))
        .bind(instant_to_text(to))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        from_rows(rows)
    }

    async fn find_by_contact(&self, contact: ContactId) -> Result<Vec<Appointment>, PortError> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE contact_id = ? ORDER BY start_utc, id"
        ))
        .bind(contact.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        from_rows(rows)
    }

    async fn list_kinds(&self) -> Result<Vec<String>, PortError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT kind FROM appointments ORDER BY kind")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(rows.into_iter().map(|(kind,)| kind).collect())
    }

    async fn insert(&self, appointment: &Appointment) -> Result<AppointmentId, PortError> {
        let cols = Columns::of(appointment)?;

        // The overlap check and the write are one statement, so a booking
        // stored after the caller's snapshot still blocks this one.
        let result = sqlx::query(
            "INSERT INTO appointments
                 (customer_id, contact_id, user_id, kind, start_utc, end_utc, data)
             SELECT ?, ?, ?, ?, ?, ?, ?
             WHERE NOT EXISTS (
                 SELECT 1 FROM appointments
                 WHERE customer_id = ? AND start_utc < ? AND end_utc > ?
             )",
        )
        .bind(cols.customer_id)
        .bind(cols.contact_id)
        .bind(cols.user_id)
        .bind(&cols.kind)
        .bind(&cols.start)
        .bind(&cols.end)
        .bind(&cols.data)
        .bind(cols.customer_id)
        .bind(&cols.end)
        .bind(&cols.start)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::warn!(
                customer_id = cols.customer_id,
                start = %cols.start,
                "insert blocked by overlapping appointment"
            );
            return Err(PortError::Conflict);
        }

        let id = AppointmentId::new(result.last_insert_rowid());
        tracing::debug!(%id, customer_id = cols.customer_id, "appointment stored");
        Ok(id)
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), PortError> {
        let id = appointment.id().ok_or(PortError::NotFound)?;
        let cols = Columns::of(appointment)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM appointments WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;
        if exists.is_none() {
            return Err(PortError::NotFound);
        }

        let result = sqlx::query(
            "UPDATE appointments
             SET customer_id = ?, contact_id = ?, user_id = ?, kind = ?,
                 start_utc = ?, end_utc = ?, data = ?
             WHERE id = ? AND NOT EXISTS (
                 SELECT 1 FROM appointments
                 WHERE customer_id = ? AND id <> ? AND start_utc < ? AND end_utc > ?
             )",
        )
        .bind(cols.customer_id)
        .bind(cols.contact_id)
        .bind(cols.user_id)
        .bind(&cols.kind)
        .bind(&cols.start)
        .bind(&cols.end)
        .bind(&cols.data)
        .bind(id.value())
        .bind(cols.customer_id)
        .bind(id.value())
        .bind(&cols.end)
        .bind(&cols.start)
        .execute(&mut *tx)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::warn!(%id, "update blocked by overlapping appointment");
            return Err(PortError::Conflict);
        }

        tx.commit()
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        tracing::debug!(%id, "appointment updated");
        Ok(())
    }

    async fn delete(&self, id: AppointmentId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound);
        }
        tracing::debug!(%id, "appointment deleted");
        Ok(())
    }

    async fn delete_for_customer(&self, customer: CustomerId) -> Result<u64, PortError> {
        let result = sqlx::query("DELETE FROM appointments WHERE customer_id = ?")
            .bind(customer.value())
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        tracing::debug!(%customer, removed = result.rows_affected(), "customer appointments deleted");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::ids::UserId;

    async fn db() -> SqliteDb {
        SqliteDb::new("sqlite::memory:").await.unwrap()
    }

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn details(title: &str, kind: &str, contact: i64) -> AppointmentDetails {
        AppointmentDetails {
            title: title.into(),
            description: "desc".into(),
            location: "Room 1".into(),
            kind: kind.into(),
            contact_id: Some(ContactId::new(contact)),
            user_id: Some(UserId::new(1)),
        }
    }

    fn candidate(customer: i64, start: &str, end: &str) -> Appointment {
        Appointment::candidate(
            CustomerId::new(customer),
            ts(start),
            ts(end),
            details("Sync", "Planning", 1),
        )
    }

    #[tokio::test]
    async fn insert_and_find_by_id() {
        let db = db().await;
        let cand = candidate(5, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z");

        let id = db.insert(&cand).await.unwrap();
        let found = db.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(found.id(), Some(id));
        assert_eq!(found.customer_id(), CustomerId::new(5));
        assert_eq!(found.start(), ts("2024-06-10T13:00:00Z"));
        assert_eq!(found.end(), ts("2024-06-10T14:00:00Z"));
        assert_eq!(found.details(), cand.details());
    }

    #[tokio::test]
    async fn stored_instants_keep_full_precision() {
        let db = db().await;
        let start = ts("2024-06-10T13:00:00.000000001Z");
        let end = ts("2024-06-10T14:00:00.999999999Z");
        let cand = Appointment::candidate(
            CustomerId::new(5),
            start,
            end,
            details("Sync", "Planning", 1),
        );

        let id = db.insert(&cand).await.unwrap();
        let found = db.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.start(), start);
        assert_eq!(found.end(), end);
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let db = db().await;
        assert!(db.find_by_id(AppointmentId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_overlapping_same_customer_conflicts() {
        let db = db().await;
        db.insert(&candidate(5, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z"))
            .await
            .unwrap();

        let err = db
            .insert(&candidate(5, "2024-06-10T13:30:00Z", "2024-06-10T14:30:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict));
        assert_eq!(db.find_for_customer(CustomerId::new(5)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insert_touching_or_other_customer_succeeds() {
        let db = db().await;
        db.insert(&candidate(5, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z"))
            .await
            .unwrap();

        db.insert(&candidate(5, "2024-06-10T14:00:00Z", "2024-06-10T15:00:00Z"))
            .await
            .unwrap();
        db.insert(&candidate(6, "2024-06-10T13:30:00Z", "2024-06-10T14:30:00Z"))
            .await
            .unwrap();

        assert_eq!(db.find_for_customer(CustomerId::new(5)).await.unwrap().len(), 2);
        assert_eq!(db.find_for_customer(CustomerId::new(6)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn inverted_interval_violates_check_constraint() {
        let db = db().await;
        let err = db
            .insert(&candidate(5, "2024-06-10T15:00:00Z", "2024-06-10T14:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Persistence(_)));
    }

    #[tokio::test]
    async fn update_moves_without_self_conflict() {
        let db = db().await;
        let id = db
            .insert(&candidate(5, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z"))
            .await
            .unwrap();

        let moved = candidate(5, "2024-06-10T13:30:00Z", "2024-06-10T14:30:00Z").with_id(id);
        db.update(&moved).await.unwrap();

        let found = db.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.start(), ts("2024-06-10T13:30:00Z"));
    }

    #[tokio::test]
    async fn update_into_other_booking_conflicts() {
        let db = db().await;
        let first = db
            .insert(&candidate(5, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z"))
            .await
            .unwrap();
        db.insert(&candidate(5, "2024-06-10T15:00:00Z", "2024-06-10T16:00:00Z"))
            .await
            .unwrap();

        let moved = candidate(5, "2024-06-10T14:30:00Z", "2024-06-10T15:30:00Z").with_id(first);
        let err = db.update(&moved).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict));

        let unchanged = db.find_by_id(first).await.unwrap().unwrap();
        assert_eq!(unchanged.start(), ts("2024-06-10T13:00:00Z"));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let db = db().await;
        let ghost = candidate(5, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z")
            .with_id(AppointmentId::new(42));
        assert!(matches!(db.update(&ghost).await, Err(PortError::NotFound)));

        let unsaved = candidate(5, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z");
        assert!(matches!(db.update(&unsaved).await, Err(PortError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let db = db().await;
        let id = db
            .insert(&candidate(5, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z"))
            .await
            .unwrap();

        db.delete(id).await.unwrap();
        assert!(db.find_by_id(id).await.unwrap().is_none());
        assert!(matches!(db.delete(id).await, Err(PortError::NotFound)));
    }

    #[tokio::test]
    async fn delete_for_customer_counts_rows() {
        let db = db().await;
        db.insert(&candidate(5, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z"))
            .await
            .unwrap();
        db.insert(&candidate(5, "2024-06-11T13:00:00Z", "2024-06-11T14:00:00Z"))
            .await
            .unwrap();
        db.insert(&candidate(6, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z"))
            .await
            .unwrap();

        assert_eq!(db.delete_for_customer(CustomerId::new(5)).await.unwrap(), 2);
        assert_eq!(db.delete_for_customer(CustomerId::new(5)).await.unwrap(), 0);
        assert_eq!(db.find_for_customer(CustomerId::new(6)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn starting_between_is_inclusive_and_ordered() {
        let db = db().await;
        let late = db
            .insert(&candidate(1, "2024-06-10T10:15:00Z", "2024-06-10T11:00:00Z"))
            .await
            .unwrap();
        let early = db
            .insert(&candidate(2, "2024-06-10T10:00:00Z", "2024-06-10T11:00:00Z"))
            .await
            .unwrap();
        db.insert(&candidate(3, "2024-06-10T10:16:00Z", "2024-06-10T11:00:00Z"))
            .await
            .unwrap();

        let hits = db
            .find_starting_between(ts("2024-06-10T10:00:00Z"), ts("2024-06-10T10:15:00Z"))
            .await
            .unwrap();
        let ids: Vec<_> = hits.iter().filter_map(|a| a.id()).collect();
        assert_eq!(ids, vec![early, late]);
    }

    #[tokio::test]
    async fn kinds_and_contact_lookup() {
        let db = db().await;
        for (customer, kind, contact, start, end) in [
            (1, "Planning", 1, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z"),
            (2, "De-Briefing", 2, "2024-06-10T13:00:00Z", "2024-06-10T14:00:00Z"),
            (3, "Planning", 1, "2024-06-10T15:00:00Z", "2024-06-10T16:00:00Z"),
        ] {
            let cand = Appointment::candidate(
                CustomerId::new(customer),
                ts(start),
                ts(end),
                details("x", kind, contact),
            );
            db.insert(&cand).await.unwrap();
        }

        assert_eq!(db.list_kinds().await.unwrap(), vec!["De-Briefing", "Planning"]);
        let for_one = db.find_by_contact(ContactId::new(1)).await.unwrap();
        assert_eq!(for_one.len(), 2);
        assert!(for_one.iter().all(|a| a.details().contact_id == Some(ContactId::new(1))));
    }
}
