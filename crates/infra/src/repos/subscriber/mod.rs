mod inmemory;
mod postgres;

use econ_calendar_domain::{Subscriber, SubscriberKey};
pub use inmemory::InMemorySubscriberRepo;
pub use postgres::PostgresSubscriberRepo;

#[async_trait::async_trait]
pub trait ISubscriberRepo: Send + Sync {
    /// Stores the subscriber unless the (subscription, subscriber) pair already exists.
    /// Returns whether a new record was created.
    async fn insert(&self, subscriber: &Subscriber) -> anyhow::Result<bool>;
    async fn find(&self, key: &SubscriberKey) -> anyhow::Result<Option<Subscriber>>;
    async fn find_by_subscription(&self, subscription: &str) -> anyhow::Result<Vec<Subscriber>>;
    /// All subscriptions of a chat, ordered by subscription name
    async fn find_by_subscriber(&self, subscriber: &str) -> anyhow::Result<Vec<Subscriber>>;
    async fn delete(&self, key: &SubscriberKey) -> anyhow::Result<Option<Subscriber>>;
}
