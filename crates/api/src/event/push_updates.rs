use crate::error::CalendarError;
use crate::shared::usecase::UseCase;
use econ_calendar_api_structs::dtos::{DeliveryFailureDTO, PushReportDTO};
use econ_calendar_domain::{CalendarEvent, Entity, Subscription, TimeSpan};
use econ_calendar_infra::CalendarContext;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use tracing::{error, info, warn};

/// Notifies every subscriber of the events that are due and records
/// each successful notification on the event
#[derive(Debug)]
pub struct PushUpdatesUseCase;

#[derive(Debug)]
pub struct DeliveryFailure {
    pub entity_type: String,
    pub event_key: String,
    pub subscriber: Option<String>,
    pub reason: String,
}

impl From<DeliveryFailure> for DeliveryFailureDTO {
    fn from(f: DeliveryFailure) -> Self {
        Self {
            entity_type: f.entity_type,
            event_key: f.event_key,
            subscriber: f.subscriber,
            reason: f.reason,
        }
    }
}

#[derive(Debug, Default)]
pub struct PushReport {
    pub due_events: usize,
    pub notifications_sent: usize,
    pub already_notified: usize,
    pub delivered_events: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl From<PushReport> for PushReportDTO {
    fn from(r: PushReport) -> Self {
        Self {
            due_events: r.due_events,
            notifications_sent: r.notifications_sent,
            already_notified: r.already_notified,
            delivered_events: r.delivered_events,
            failures: r.failures.into_iter().map(DeliveryFailureDTO::from).collect(),
        }
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError(anyhow::Error),
}

impl From<UseCaseError> for CalendarError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError(e) => Self::StoreUnavailable(e.to_string()),
        }
    }
}

/// Subscribers of the event category together with the subscribers of everything
async fn resolve_subscribers(
    event: &CalendarEvent,
    ctx: &CalendarContext,
) -> anyhow::Result<BTreeSet<String>> {
    let mut subscribers = BTreeSet::new();
    for subscription in [event.entity_type.as_str(), Subscription::ALL] {
        let found = ctx
            .repos
            .subscribers
            .find_by_subscription(subscription)
            .await?;
        subscribers.extend(found.into_iter().map(|s| s.subscriber));
    }
    Ok(subscribers)
}

impl PushReport {
    fn record_failure(&mut self, event: &CalendarEvent, subscriber: Option<&str>, reason: String) {
        let failure = DeliveryFailure {
            entity_type: event.entity_type.clone(),
            event_key: event.event_key.clone(),
            subscriber: subscriber.map(|s| s.to_string()),
            reason,
        };
        warn!(
            "{}",
            CalendarError::PartialDeliveryFailure {
                event: event.key().to_string(),
                subscriber: subscriber.unwrap_or("*").to_string(),
                reason: failure.reason.clone(),
            }
        );
        self.failures.push(failure);
    }
}

impl PushUpdatesUseCase {
    async fn push_event(event: &CalendarEvent, report: &mut PushReport, ctx: &CalendarContext) {
        let subscribers = match resolve_subscribers(event, ctx).await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                report.record_failure(
                    event,
                    None,
                    format!("Unable to resolve subscribers: {}", e),
                );
                return;
            }
        };

        let pending = subscribers
            .into_iter()
            .filter(|subscriber| {
                if event.is_notified(subscriber) {
                    report.already_notified += 1;
                    false
                } else {
                    true
                }
            })
            .collect::<Vec<_>>();

        let text = event.notification_text();
        let results = stream::iter(pending.iter())
            .map(|subscriber| {
                let text = &text;
                async move { (subscriber, ctx.chat.send_message(subscriber, text).await) }
            })
            .buffer_unordered(ctx.config.push_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let key = event.key();
        let mut all_recorded = true;
        for (subscriber, res) in results {
            if let Err(e) = res {
                all_recorded = false;
                report.record_failure(event, Some(subscriber.as_str()), e.to_string());
                continue;
            }
            report.notifications_sent += 1;
            if let Err(e) = ctx.repos.events.mark_notified(&key, subscriber).await {
                all_recorded = false;
                report.record_failure(
                    event,
                    Some(subscriber.as_str()),
                    format!("Notification sent but not recorded: {}", e),
                );
            }
        }

        if !all_recorded {
            return;
        }
        match ctx
            .repos
            .events
            .mark_delivered(&key, ctx.sys.get_timestamp_millis())
            .await
        {
            Ok(true) => report.delivered_events += 1,
            // Another push tick got there first
            Ok(false) => {}
            Err(e) => error!("Unable to mark event: {} as delivered. Error: {:?}", key, e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for PushUpdatesUseCase {
    type Response = PushReport;
    type Error = UseCaseError;

    const NAME: &'static str = "PushUpdates";

    async fn execute(&mut self, ctx: &CalendarContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let window = TimeSpan::around(now, ctx.config.push_lead_time);
        let events = ctx
            .repos
            .events
            .find_undelivered(&window)
            .await
            .map_err(UseCaseError::StorageError)?;

        let mut report = PushReport {
            due_events: events.len(),
            ..Default::default()
        };
        for event in &events {
            Self::push_event(event, &mut report, ctx).await;
        }

        info!(
            "Pushed updates. Due events: {}, sent: {}, delivered events: {}, failures: {}",
            report.due_events,
            report.notifications_sent,
            report.delivered_events,
            report.failures.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use econ_calendar_domain::{format_event_key, EventKey, Impact, Subscriber};
    use econ_calendar_infra::{
        IChatPlatform, InMemoryChatPlatform, InMemoryEventRepo, InMemorySubscriberRepo, Repos,
        StaticTimeSys,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    // 2024-01-01T10:00:00Z
    const E1_TS: i64 = 1704103200000;
    const MINUTE: i64 = 60 * 1000;

    fn event_factory(entity_type: &str, source_id: &str, scheduled_at: i64) -> CalendarEvent {
        CalendarEvent {
            entity_type: entity_type.into(),
            event_key: format_event_key(source_id, scheduled_at),
            source_id: source_id.into(),
            title: "Gold fixing".into(),
            country: "XAU".into(),
            impact: Impact::High,
            scheduled_at,
            forecast: None,
            previous: None,
            actual: None,
            notified: Vec::new(),
            delivered: false,
            delivered_at: None,
            created: 0,
            updated: 0,
        }
    }

    fn context_at(
        now: i64,
        repos_from: Option<&CalendarContext>,
    ) -> (CalendarContext, Arc<InMemoryChatPlatform>) {
        let chat = Arc::new(InMemoryChatPlatform::new());
        let base = repos_from
            .cloned()
            .unwrap_or_else(CalendarContext::create_inmemory);
        let ctx = CalendarContext {
            chat: chat.clone(),
            sys: Arc::new(StaticTimeSys(now)),
            ..base
        };
        (ctx, chat)
    }

    struct Stores {
        subscribers: Arc<InMemorySubscriberRepo>,
        events: Arc<InMemoryEventRepo>,
    }

    fn context_with_stores(now: i64) -> (CalendarContext, Stores, Arc<InMemoryChatPlatform>) {
        let stores = Stores {
            subscribers: Arc::new(InMemorySubscriberRepo::new()),
            events: Arc::new(InMemoryEventRepo::new()),
        };
        let (ctx, chat) = context_at(now, None);
        let ctx = CalendarContext {
            repos: Repos {
                subscribers: stores.subscribers.clone(),
                events: stores.events.clone(),
            },
            ..ctx
        };
        (ctx, stores, chat)
    }

    /// Chat platform that takes a while to answer and remembers how many sends overlapped
    #[derive(Default)]
    struct SlowChatPlatform {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        sent: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl IChatPlatform for SlowChatPlatform {
        async fn send_message(&self, _chat_id: &str, _text: &str) -> anyhow::Result<()> {
            let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
            actix_web::rt::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn subscribe(ctx: &CalendarContext, subscription: &str, chat: &str) {
        let subscription: Subscription = subscription.parse().unwrap();
        ctx.repos
            .subscribers
            .insert(&Subscriber::new(&subscription, chat, 0))
            .await
            .unwrap();
    }

    fn e1_key() -> EventKey {
        event_factory("gold-prices", "E1", E1_TS).key()
    }

    #[actix_web::test]
    async fn notifies_once_and_marks_delivery() {
        let (ctx, chat) = context_at(E1_TS - MINUTE, None);
        subscribe(&ctx, "gold-prices", "chat42").await;
        ctx.repos
            .events
            .upsert(&event_factory("gold-prices", "E1", E1_TS))
            .await
            .unwrap();

        let report = PushUpdatesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.due_events, 1);
        assert_eq!(report.notifications_sent, 1);
        assert_eq!(report.delivered_events, 1);
        assert!(report.failures.is_empty());
        assert_eq!(chat.sent_to("chat42").len(), 1);

        let stored = ctx.repos.events.find(&e1_key()).await.unwrap().unwrap();
        assert!(stored.delivered);
        assert_eq!(stored.delivered_at, Some(E1_TS - MINUTE));
        assert_eq!(stored.notified, vec!["chat42".to_string()]);

        // The next tick does not select the event again
        let (ctx, chat) = context_at(E1_TS, Some(&ctx));
        let report = PushUpdatesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.due_events, 0);
        assert!(chat.sent_messages().is_empty());
    }

    #[actix_web::test]
    async fn only_due_events_in_the_subscribed_category_are_pushed() {
        let (ctx, chat) = context_at(E1_TS, None);
        subscribe(&ctx, "gold-prices", "chat42").await;
        subscribe(&ctx, "oil", "chat7").await;
        subscribe(&ctx, "all", "chat1").await;
        // Subscribed both to the category and to everything
        subscribe(&ctx, "all", "chat42").await;

        for event in [
            event_factory("gold-prices", "E1", E1_TS),
            event_factory("gold-prices", "E2", E1_TS + 60 * MINUTE),
        ] {
            ctx.repos.events.upsert(&event).await.unwrap();
        }

        let report = PushUpdatesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.due_events, 1);
        assert_eq!(report.notifications_sent, 2);
        assert_eq!(chat.sent_to("chat42").len(), 1);
        assert_eq!(chat.sent_to("chat1").len(), 1);
        assert!(chat.sent_to("chat7").is_empty());
    }

    #[actix_web::test]
    async fn partial_failure_only_retries_the_failed_subscriber() {
        let (ctx, chat) = context_at(E1_TS, None);
        subscribe(&ctx, "gold-prices", "a").await;
        subscribe(&ctx, "gold-prices", "b").await;
        ctx.repos
            .events
            .upsert(&event_factory("gold-prices", "E1", E1_TS))
            .await
            .unwrap();
        chat.fail_chat("b");

        let report = PushUpdatesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.notifications_sent, 1);
        assert_eq!(report.delivered_events, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].subscriber, Some("b".to_string()));

        let stored = ctx.repos.events.find(&e1_key()).await.unwrap().unwrap();
        assert_eq!(stored.notified, vec!["a".to_string()]);
        assert!(!stored.delivered);

        // b is reachable again on the next tick
        chat.restore_chat("b");
        let report = PushUpdatesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.already_notified, 1);
        assert_eq!(report.notifications_sent, 1);
        assert_eq!(report.delivered_events, 1);
        assert_eq!(chat.sent_to("a").len(), 1);
        assert_eq!(chat.sent_to("b").len(), 1);

        let stored = ctx.repos.events.find(&e1_key()).await.unwrap().unwrap();
        assert!(stored.delivered);
        assert_eq!(stored.notified.len(), 2);
    }

    #[actix_web::test]
    async fn limits_concurrent_sends_per_event() {
        let (mut ctx, _) = context_at(E1_TS, None);
        let chat = Arc::new(SlowChatPlatform::default());
        ctx.chat = chat.clone();
        ctx.config.push_concurrency = 2;
        for i in 0..6 {
            subscribe(&ctx, "gold-prices", &format!("chat{}", i)).await;
        }
        ctx.repos
            .events
            .upsert(&event_factory("gold-prices", "E1", E1_TS))
            .await
            .unwrap();

        let report = PushUpdatesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.notifications_sent, 6);
        assert_eq!(report.delivered_events, 1);
        assert_eq!(chat.sent.load(Ordering::SeqCst), 6);
        assert_eq!(chat.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn aborts_when_due_events_cannot_be_read() {
        let (ctx, stores, chat) = context_with_stores(E1_TS);
        subscribe(&ctx, "gold-prices", "chat42").await;
        ctx.repos
            .events
            .upsert(&event_factory("gold-prices", "E1", E1_TS))
            .await
            .unwrap();
        stores.events.set_unavailable(true);

        let res = PushUpdatesUseCase.execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseError::StorageError(_))));
        assert!(matches!(
            res.map_err(CalendarError::from),
            Err(CalendarError::StoreUnavailable(_))
        ));
        assert!(chat.sent_messages().is_empty());
    }

    #[actix_web::test]
    async fn subscriber_lookup_failure_is_recorded_per_event() {
        let (ctx, stores, chat) = context_with_stores(E1_TS);
        subscribe(&ctx, "gold-prices", "chat42").await;
        for event in [
            event_factory("gold-prices", "E1", E1_TS),
            event_factory("oil", "E2", E1_TS + MINUTE),
        ] {
            ctx.repos.events.upsert(&event).await.unwrap();
        }
        stores.subscribers.set_unavailable(true);

        let report = PushUpdatesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.due_events, 2);
        assert_eq!(report.notifications_sent, 0);
        assert_eq!(report.delivered_events, 0);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures.iter().all(|f| f.subscriber.is_none()));
        assert!(chat.sent_messages().is_empty());

        // Nothing was marked, so both events are picked up again once the store is back
        stores.subscribers.set_unavailable(false);
        let report = PushUpdatesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.due_events, 2);
        assert_eq!(report.notifications_sent, 1);
        assert_eq!(report.delivered_events, 2);
        assert_eq!(chat.sent_to("chat42").len(), 1);
    }

    #[actix_web::test]
    async fn unrecorded_notification_keeps_event_undelivered() {
        let (ctx, stores, chat) = context_with_stores(E1_TS);
        subscribe(&ctx, "gold-prices", "chat42").await;
        ctx.repos
            .events
            .upsert(&event_factory("gold-prices", "E1", E1_TS))
            .await
            .unwrap();
        stores.events.set_writes_unavailable(true);

        let report = PushUpdatesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.notifications_sent, 1);
        assert_eq!(report.delivered_events, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].subscriber, Some("chat42".to_string()));
        assert_eq!(chat.sent_to("chat42").len(), 1);

        stores.events.set_writes_unavailable(false);
        let stored = ctx.repos.events.find(&e1_key()).await.unwrap().unwrap();
        assert!(stored.notified.is_empty());
        assert!(!stored.delivered);
    }
}
