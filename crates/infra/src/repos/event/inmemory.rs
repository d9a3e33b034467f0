use super::{IEventRepo, UpsertResult};
use crate::repos::shared::inmemory_repo::*;
use anyhow::anyhow;
use econ_calendar_domain::{CalendarEvent, Entity, EventKey, TimeSpan};
use std::sync::Mutex;

pub struct InMemoryEventRepo {
    events: Mutex<Vec<CalendarEvent>>,
    unavailable: Mutex<bool>,
    writes_unavailable: Mutex<bool>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            unavailable: Mutex::new(false),
            writes_unavailable: Mutex::new(false),
        }
    }

    /// Makes every call fail until it is switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    /// Reads keep working while every write fails
    pub fn set_writes_unavailable(&self, unavailable: bool) {
        *self.writes_unavailable.lock().unwrap() = unavailable;
    }

    fn check_readable(&self) -> anyhow::Result<()> {
        if *self.unavailable.lock().unwrap() {
            return Err(anyhow!("Event store is unavailable"));
        }
        Ok(())
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        self.check_readable()?;
        if *self.writes_unavailable.lock().unwrap() {
            return Err(anyhow!("Event store rejected the write"));
        }
        Ok(())
    }
}

fn sorted(mut events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    events.sort_by_key(|e| e.scheduled_at);
    events
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn upsert(&self, event: &CalendarEvent) -> anyhow::Result<UpsertResult> {
        self.check_writable()?;
        let res = update(&event.key(), &self.events, |stored| {
            if stored.has_same_display_fields(event) {
                UpsertResult::Unchanged
            } else {
                stored.apply_display_fields(event, event.updated);
                UpsertResult::Updated
            }
        });
        match res {
            Some(res) => Ok(res),
            // Another writer may have inserted in between, in which case the
            // fetched values are discarded just like a conflicting insert would be
            None if insert_if_absent(event, &self.events) => Ok(UpsertResult::Inserted),
            None => Ok(UpsertResult::Unchanged),
        }
    }

    async fn find(&self, key: &EventKey) -> anyhow::Result<Option<CalendarEvent>> {
        self.check_readable()?;
        Ok(find(key, &self.events))
    }

    async fn find_by_entity_type(
        &self,
        entity_type: &str,
        timespan: Option<&TimeSpan>,
    ) -> anyhow::Result<Vec<CalendarEvent>> {
        self.check_readable()?;
        let events = find_by(&self.events, |e| {
            e.entity_type == entity_type
                && timespan
                    .map(|timespan| timespan.contains(e.scheduled_at))
                    .unwrap_or(true)
        });
        Ok(sorted(events))
    }

    async fn find_undelivered(&self, timespan: &TimeSpan) -> anyhow::Result<Vec<CalendarEvent>> {
        self.check_readable()?;
        let events = find_by(&self.events, |e| {
            !e.delivered && timespan.contains(e.scheduled_at)
        });
        Ok(sorted(events))
    }

    async fn mark_notified(&self, key: &EventKey, subscriber: &str) -> anyhow::Result<bool> {
        self.check_writable()?;
        let res = update(key, &self.events, |e| {
            if e.is_notified(subscriber) {
                false
            } else {
                e.notified.push(subscriber.to_string());
                true
            }
        });
        Ok(res.unwrap_or(false))
    }

    async fn mark_delivered(&self, key: &EventKey, delivered_at: i64) -> anyhow::Result<bool> {
        self.check_writable()?;
        let res = update(key, &self.events, |e| {
            if e.delivered {
                false
            } else {
                e.delivered = true;
                e.delivered_at = Some(delivered_at);
                true
            }
        });
        Ok(res.unwrap_or(false))
    }

    async fn delete(&self, key: &EventKey) -> anyhow::Result<Option<CalendarEvent>> {
        self.check_writable()?;
        Ok(delete(key, &self.events))
    }

    async fn delete_scheduled_before(&self, timestamp: i64) -> anyhow::Result<u64> {
        self.check_writable()?;
        Ok(delete_by(&self.events, |e| e.scheduled_at < timestamp))
    }
}
