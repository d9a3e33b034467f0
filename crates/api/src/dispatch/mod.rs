mod invoke;

use crate::command::HandleCommandUseCase;
use crate::error::CalendarError;
use crate::event::{PushUpdatesUseCase, RefreshEventsUseCase};
use crate::shared::usecase::execute;
use actix_web::web;
use econ_calendar_api_structs::{
    invoke::APIResponse, CommandMessage, ScheduledTrigger, PUSH_UPDATES_TRIGGER,
    UPDATE_EVENTS_TRIGGER,
};
use econ_calendar_infra::CalendarContext;
use invoke::{invoke_controller, invoke_payload_error_handler};
use serde_json::Value;

/// Everything the worker can be invoked with
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Command(CommandMessage),
    RefreshTick,
    PushTick,
}

const MAX_PAYLOAD_PREVIEW: usize = 200;

fn unrecognized(payload: &Value) -> CalendarError {
    let preview = payload
        .to_string()
        .chars()
        .take(MAX_PAYLOAD_PREVIEW)
        .collect::<String>();
    CalendarError::UnrecognizedTrigger(preview)
}

impl Trigger {
    /// Scheduled triggers are tagged by `event`, everything else has to be a command message
    pub fn parse(payload: &Value) -> Result<Self, CalendarError> {
        if payload.get("event").is_some() {
            let trigger: ScheduledTrigger =
                serde_json::from_value(payload.clone()).map_err(|_| unrecognized(payload))?;
            return match trigger.event.as_str() {
                UPDATE_EVENTS_TRIGGER => Ok(Self::RefreshTick),
                PUSH_UPDATES_TRIGGER => Ok(Self::PushTick),
                _ => Err(unrecognized(payload)),
            };
        }

        match serde_json::from_value::<CommandMessage>(payload.clone()) {
            Ok(message) if !message.chat_id.trim().is_empty() => Ok(Self::Command(message)),
            _ => Err(unrecognized(payload)),
        }
    }
}

pub async fn dispatch(trigger: Trigger, ctx: &CalendarContext) -> Result<APIResponse, CalendarError> {
    match trigger {
        Trigger::Command(message) => execute(HandleCommandUseCase { message }, ctx)
            .await
            .map(|res| APIResponse::Command(res.into())),
        Trigger::RefreshTick => execute(RefreshEventsUseCase, ctx)
            .await
            .map(|report| APIResponse::RefreshTick(report.into()))
            .map_err(CalendarError::from),
        Trigger::PushTick => execute(PushUpdatesUseCase, ctx)
            .await
            .map(|report| APIResponse::PushTick(report.into()))
            .map_err(CalendarError::from),
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/invoke")
            .app_data(web::JsonConfig::default().error_handler(invoke_payload_error_handler))
            .route(web::post().to(invoke_controller)),
    );
}

#[cfg(test)]
mod test {
    use super::*;
    use econ_calendar_infra::{
        InMemoryCalendarFeed, InMemoryChatPlatform, InMemoryEventRepo, InMemorySubscriberRepo,
        Repos,
    };
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn parses_scheduled_triggers() {
        assert_eq!(
            Trigger::parse(&json!({ "event": "update-events" })).unwrap(),
            Trigger::RefreshTick
        );
        assert_eq!(
            Trigger::parse(&json!({ "event": "push-updates" })).unwrap(),
            Trigger::PushTick
        );
    }

    #[test]
    fn parses_command_messages() {
        let trigger = Trigger::parse(&json!({
            "chatId": "chat42",
            "commandName": "/subscribe",
            "args": ["gold-prices"]
        }))
        .unwrap();
        assert_eq!(
            trigger,
            Trigger::Command(CommandMessage {
                chat_id: "chat42".into(),
                command_name: "/subscribe".into(),
                args: vec!["gold-prices".into()],
            })
        );

        // args may be left out
        let trigger = Trigger::parse(&json!({ "chatId": "chat42", "commandName": "list" }));
        assert!(matches!(trigger, Ok(Trigger::Command(m)) if m.args.is_empty()));
    }

    #[test]
    fn rejects_unknown_payloads() {
        for payload in [
            json!({ "event": "rebuild-everything" }),
            json!({ "event": 5 }),
            json!({ "chatId": "", "commandName": "list" }),
            json!({ "hello": "world" }),
            json!([1, 2, 3]),
        ] {
            assert!(matches!(
                Trigger::parse(&payload),
                Err(CalendarError::UnrecognizedTrigger(_))
            ));
        }
    }

    #[actix_web::test]
    async fn routes_each_trigger_to_its_handler() {
        let feed = Arc::new(InMemoryCalendarFeed::new());
        let chat = Arc::new(InMemoryChatPlatform::new());
        let ctx = CalendarContext {
            feed: feed.clone(),
            chat: chat.clone(),
            ..CalendarContext::create_inmemory()
        };

        let res = dispatch(
            Trigger::Command(CommandMessage {
                chat_id: "chat42".into(),
                command_name: "help".into(),
                args: Vec::new(),
            }),
            &ctx,
        )
        .await
        .unwrap();
        assert!(matches!(res, APIResponse::Command(outcome) if outcome.accepted));
        assert_eq!(chat.sent_to("chat42").len(), 1);

        let res = dispatch(Trigger::RefreshTick, &ctx).await.unwrap();
        assert!(matches!(res, APIResponse::RefreshTick(report) if report.fetched == 0));

        let res = dispatch(Trigger::PushTick, &ctx).await.unwrap();
        assert!(matches!(res, APIResponse::PushTick(report) if report.due_events == 0));

        feed.set_unavailable(true);
        let res = dispatch(Trigger::RefreshTick, &ctx).await;
        assert!(matches!(res, Err(CalendarError::FeedUnavailable(_))));
    }

    #[actix_web::test]
    async fn command_is_not_answered_while_the_store_is_down() {
        let subscribers = Arc::new(InMemorySubscriberRepo::new());
        let chat = Arc::new(InMemoryChatPlatform::new());
        let ctx = CalendarContext {
            repos: Repos {
                subscribers: subscribers.clone(),
                events: Arc::new(InMemoryEventRepo::new()),
            },
            chat: chat.clone(),
            ..CalendarContext::create_inmemory()
        };
        let subscribe = Trigger::Command(CommandMessage {
            chat_id: "chat42".into(),
            command_name: "/subscribe".into(),
            args: vec!["gold-prices".into()],
        });

        subscribers.set_unavailable(true);
        let res = dispatch(subscribe.clone(), &ctx).await;
        assert!(matches!(res, Err(CalendarError::StoreUnavailable(_))));
        assert!(chat.sent_messages().is_empty());

        // The redelivered message gets the only reply
        subscribers.set_unavailable(false);
        let res = dispatch(subscribe, &ctx).await.unwrap();
        assert!(matches!(res, APIResponse::Command(outcome) if outcome.changed));
        assert_eq!(chat.sent_to("chat42").len(), 1);
    }
}
