use super::ICalendarFeed;
use anyhow::anyhow;
use econ_calendar_domain::FeedOccurrence;
use std::sync::Mutex;

/// Feed double that serves whatever occurrences it was given
pub struct InMemoryCalendarFeed {
    occurrences: Mutex<Vec<FeedOccurrence>>,
    unavailable: Mutex<bool>,
}

impl InMemoryCalendarFeed {
    pub fn new() -> Self {
        Self {
            occurrences: Mutex::new(Vec::new()),
            unavailable: Mutex::new(false),
        }
    }

    pub fn set_occurrences(&self, occurrences: Vec<FeedOccurrence>) {
        *self.occurrences.lock().unwrap() = occurrences;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }
}

#[async_trait::async_trait]
impl ICalendarFeed for InMemoryCalendarFeed {
    async fn fetch_upcoming(&self) -> anyhow::Result<Vec<FeedOccurrence>> {
        if *self.unavailable.lock().unwrap() {
            return Err(anyhow!("Calendar feed is unavailable"));
        }
        Ok(self.occurrences.lock().unwrap().clone())
    }
}
