mod inmemory;
mod postgres;

use econ_calendar_domain::{CalendarEvent, EventKey, TimeSpan};
pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;

/// Outcome of storing a fetched occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertResult {
    Inserted,
    /// Some display field differed from the stored record and was overwritten
    Updated,
    Unchanged,
}

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    /// Inserts the event, or overwrites the display fields of the stored event
    /// with the same key when they differ. Delivery state of an existing
    /// event is never modified.
    async fn upsert(&self, event: &CalendarEvent) -> anyhow::Result<UpsertResult>;
    async fn find(&self, key: &EventKey) -> anyhow::Result<Option<CalendarEvent>>;
    async fn find_by_entity_type(
        &self,
        entity_type: &str,
        timespan: Option<&TimeSpan>,
    ) -> anyhow::Result<Vec<CalendarEvent>>;
    /// Events not yet marked delivered that are scheduled within the timespan,
    /// ordered by `scheduled_at`
    async fn find_undelivered(&self, timespan: &TimeSpan) -> anyhow::Result<Vec<CalendarEvent>>;
    /// Records that the subscriber has been notified about the event.
    /// Returns false if the event does not exist or the subscriber was already recorded.
    async fn mark_notified(&self, key: &EventKey, subscriber: &str) -> anyhow::Result<bool>;
    /// Returns false if the event does not exist or was already delivered.
    async fn mark_delivered(&self, key: &EventKey, delivered_at: i64) -> anyhow::Result<bool>;
    async fn delete(&self, key: &EventKey) -> anyhow::Result<Option<CalendarEvent>>;
    /// Deletes every event scheduled strictly before the given timestamp
    async fn delete_scheduled_before(&self, timestamp: i64) -> anyhow::Result<u64>;
}
