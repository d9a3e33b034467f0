use super::ISubscriberRepo;
use crate::repos::shared::inmemory_repo::*;
use anyhow::anyhow;
use econ_calendar_domain::{Subscriber, SubscriberKey};
use std::sync::Mutex;

pub struct InMemorySubscriberRepo {
    subscribers: Mutex<Vec<Subscriber>>,
    unavailable: Mutex<bool>,
}

impl InMemorySubscriberRepo {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            unavailable: Mutex::new(false),
        }
    }

    /// Makes every call fail until it is switched back, like a store outage would
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    fn check_available(&self) -> anyhow::Result<()> {
        if *self.unavailable.lock().unwrap() {
            return Err(anyhow!("Subscriber store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ISubscriberRepo for InMemorySubscriberRepo {
    async fn insert(&self, subscriber: &Subscriber) -> anyhow::Result<bool> {
        self.check_available()?;
        Ok(insert_if_absent(subscriber, &self.subscribers))
    }

    async fn find(&self, key: &SubscriberKey) -> anyhow::Result<Option<Subscriber>> {
        self.check_available()?;
        Ok(find(key, &self.subscribers))
    }

    async fn find_by_subscription(&self, subscription: &str) -> anyhow::Result<Vec<Subscriber>> {
        self.check_available()?;
        Ok(find_by(&self.subscribers, |s| s.subscription == subscription))
    }

    async fn find_by_subscriber(&self, subscriber: &str) -> anyhow::Result<Vec<Subscriber>> {
        self.check_available()?;
        let mut subscribers = find_by(&self.subscribers, |s| s.subscriber == subscriber);
        subscribers.sort_by(|a, b| a.subscription.cmp(&b.subscription));
        Ok(subscribers)
    }

    async fn delete(&self, key: &SubscriberKey) -> anyhow::Result<Option<Subscriber>> {
        self.check_available()?;
        Ok(delete(key, &self.subscribers))
    }
}
