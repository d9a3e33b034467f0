mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{
    IEventRepo, ISubscriberRepo, InMemoryEventRepo, InMemorySubscriberRepo, Repos, UpsertResult,
};
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::warn;

const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

#[derive(Clone)]
pub struct CalendarContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub feed: Arc<dyn ICalendarFeed>,
    pub chat: Arc<dyn IChatPlatform>,
}

impl CalendarContext {
    async fn create(config: Config) -> anyhow::Result<Self> {
        let repos = match std::env::var(PSQL_CONNECTION_STRING) {
            Ok(connection_string) => Repos::create_postgres(&connection_string).await?,
            Err(_) => {
                warn!(
                    "{} env var not set, going to use the inmemory stores. Subscribers and events will be lost on restart.",
                    PSQL_CONNECTION_STRING
                );
                Repos::create_inmemory()
            }
        };
        let feed = HttpCalendarFeed::new(config.calendar_feed_url.clone(), config.http_timeout)?;
        let chat = TelegramBotApi::new(
            config.telegram_api_base_url.clone(),
            config.telegram_bot_token.clone(),
            config.http_timeout,
        )?;

        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            feed: Arc::new(feed),
            chat: Arc::new(chat),
        })
    }

    /// Context without any external dependencies, meant for testing
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::default(),
            sys: Arc::new(RealSys {}),
            feed: Arc::new(InMemoryCalendarFeed::new()),
            chat: Arc::new(InMemoryChatPlatform::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<CalendarContext> {
    CalendarContext::create(Config::from_env()?).await
}
