use async_trait::async_trait;

use agenda_core::events::DomainEvent;
use agenda_ports::error::PortError;
use agenda_ports::outbound::EventPublisher;

use super::{instant_to_text, SqliteDb};

#[async_trait]
impl EventPublisher for SqliteDb {
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), PortError> {
        for event in &events {
            let event_type = event.event_type();
            let data =
                serde_json::to_string(event).map_err(|e| PortError::Persistence(e.to_string()))?;
            let occurred_at = instant_to_text(event.occurred_at());

            sqlx::query("INSERT INTO events (event_type, data, occurred_at) VALUES (?, ?, ?)")
                .bind(event_type)
                .bind(&data)
                .bind(&occurred_at)
                .execute(&self.pool)
                .await
                .map_err(|e| PortError::Persistence(e.to_string()))?;
        }
        tracing::trace!(count = events.len(), "events recorded");
        Ok(())
    }
}
