mod event;
mod shared;
mod subscriber;

pub use event::{IEventRepo, InMemoryEventRepo, UpsertResult};
use event::PostgresEventRepo;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use subscriber::{ISubscriberRepo, InMemorySubscriberRepo};
use subscriber::PostgresSubscriberRepo;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub subscribers: Arc<dyn ISubscriberRepo>,
    pub events: Arc<dyn IEventRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        info!("DB EXECUTING MIGRATION ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB EXECUTING MIGRATION ... [done]");

        Ok(Self {
            subscribers: Arc::new(PostgresSubscriberRepo::new(pool.clone())),
            events: Arc::new(PostgresEventRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            subscribers: Arc::new(InMemorySubscriberRepo::new()),
            events: Arc::new(InMemoryEventRepo::new()),
        }
    }
}
