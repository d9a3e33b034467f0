mod inmemory;

use anyhow::anyhow;
use econ_calendar_domain::FeedOccurrence;
pub use inmemory::InMemoryCalendarFeed;
use reqwest::Client;
use std::time::Duration;
use tracing::error;

/// Source of upcoming economic calendar occurrences
#[async_trait::async_trait]
pub trait ICalendarFeed: Send + Sync {
    async fn fetch_upcoming(&self) -> anyhow::Result<Vec<FeedOccurrence>>;
}

pub struct HttpCalendarFeed {
    client: Client,
    url: String,
}

impl HttpCalendarFeed {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl ICalendarFeed for HttpCalendarFeed {
    async fn fetch_upcoming(&self) -> anyhow::Result<Vec<FeedOccurrence>> {
        let res = match self.client.get(&self.url).send().await {
            Ok(res) => res,
            Err(e) => {
                error!(
                    "[Network Error] Calendar feed GET error. Error message: {:?}",
                    e
                );
                return Err(anyhow::Error::new(e));
            }
        };

        if !res.status().is_success() {
            error!(
                "[Unexpected Response] Calendar feed responded with status: {}",
                res.status()
            );
            return Err(anyhow!(
                "Calendar feed responded with status: {}",
                res.status()
            ));
        }

        res.json::<Vec<FeedOccurrence>>().await.map_err(|e| {
            error!(
                "[Unexpected Response] Calendar feed body could not be parsed. Error message: {:?}",
                e
            );
            anyhow::Error::new(e)
        })
    }
}
