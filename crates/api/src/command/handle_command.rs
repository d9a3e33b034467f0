use super::{
    list_subscriptions::ListSubscriptionsUseCase, subscribe::SubscribeUseCase,
    unsubscribe::UnsubscribeUseCase,
};
use crate::error::CalendarError;
use crate::shared::usecase::{execute, UseCase};
use econ_calendar_api_structs::{dtos::CommandOutcomeDTO, CommandMessage};
use econ_calendar_domain::{Command, InvalidCommandError};
use econ_calendar_infra::CalendarContext;
use tracing::{error, warn};

/// Processes one inbound chat command and replies to the chat
#[derive(Debug)]
pub struct HandleCommandUseCase {
    pub message: CommandMessage,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub chat_id: String,
    pub command: Option<Command>,
    pub changed: bool,
    pub reply: String,
    pub reply_sent: bool,
    pub rejection: Option<CalendarError>,
}

impl From<UseCaseRes> for CommandOutcomeDTO {
    fn from(res: UseCaseRes) -> Self {
        Self {
            chat_id: res.chat_id,
            accepted: res.command.is_some(),
            command: res.command.map(|c| c.name().to_string()),
            changed: res.changed,
            reply: res.reply,
            reply_sent: res.reply_sent,
            error: res.rejection.map(|e| e.to_string()),
        }
    }
}

fn rejection_reply(e: &InvalidCommandError) -> String {
    format!("Sorry, I did not understand that. {}\n\n{}", e, Command::usage())
}

fn list_reply(subscriptions: &[String]) -> String {
    if subscriptions.is_empty() {
        return "You have no subscriptions. Use /subscribe <category> to add one.".into();
    }
    let lines = subscriptions
        .iter()
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Your subscriptions:\n{}", lines)
}

impl HandleCommandUseCase {
    /// Executes the parsed command and returns whether the store changed together with the reply
    async fn run(
        &self,
        command: &Command,
        ctx: &CalendarContext,
    ) -> Result<(bool, String), CalendarError> {
        let chat_id = self.message.chat_id.clone();
        match command {
            Command::Subscribe(subscription) => {
                let usecase = SubscribeUseCase {
                    subscription: subscription.clone(),
                    subscriber: chat_id,
                };
                let res = execute(usecase, ctx).await?;
                let reply = if res.created {
                    format!("Subscribed to {}.", subscription)
                } else {
                    format!("You are already subscribed to {}.", subscription)
                };
                Ok((res.created, reply))
            }
            Command::Unsubscribe(subscription) => {
                let usecase = UnsubscribeUseCase {
                    subscription: subscription.clone(),
                    subscriber: chat_id,
                };
                let res = execute(usecase, ctx).await?;
                let reply = if res.removed {
                    format!("Unsubscribed from {}.", subscription)
                } else {
                    format!("You are not subscribed to {}.", subscription)
                };
                Ok((res.removed, reply))
            }
            Command::List => {
                let usecase = ListSubscriptionsUseCase {
                    subscriber: chat_id,
                };
                let subscriptions = execute(usecase, ctx).await?;
                Ok((false, list_reply(&subscriptions)))
            }
            Command::Help => Ok((false, Command::usage().to_string())),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for HandleCommandUseCase {
    type Response = UseCaseRes;
    type Error = CalendarError;

    const NAME: &'static str = "HandleCommand";

    async fn execute(&mut self, ctx: &CalendarContext) -> Result<Self::Response, Self::Error> {
        let chat_id = self.message.chat_id.clone();

        let (command, changed, reply, rejection) =
            match Command::parse(&self.message.command_name, &self.message.args) {
                Ok(command) => {
                    // A store failure is returned without replying, so that the
                    // redelivered command gets the one reply
                    let (changed, reply) = self.run(&command, ctx).await?;
                    (Some(command), changed, reply, None)
                }
                Err(e) => {
                    let reply = rejection_reply(&e);
                    let rejection = CalendarError::from(e);
                    warn!("Rejected command from chat: {}. {}", chat_id, rejection);
                    (None, false, reply, Some(rejection))
                }
            };

        let reply_sent = match ctx.chat.send_message(&chat_id, &reply).await {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to send reply to chat: {}. Error: {:?}", chat_id, e);
                false
            }
        };

        Ok(UseCaseRes {
            chat_id,
            command,
            changed,
            reply,
            reply_sent,
            rejection,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use econ_calendar_infra::InMemoryChatPlatform;
    use std::sync::Arc;

    fn message(command_name: &str, args: &[&str]) -> CommandMessage {
        CommandMessage {
            chat_id: "chat42".into(),
            command_name: command_name.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn setup() -> (CalendarContext, Arc<InMemoryChatPlatform>) {
        let chat = Arc::new(InMemoryChatPlatform::new());
        let ctx = CalendarContext {
            chat: chat.clone(),
            ..CalendarContext::create_inmemory()
        };
        (ctx, chat)
    }

    async fn handle(ctx: &CalendarContext, command_name: &str, args: &[&str]) -> UseCaseRes {
        let mut usecase = HandleCommandUseCase {
            message: message(command_name, args),
        };
        usecase.execute(ctx).await.unwrap()
    }

    #[actix_web::test]
    async fn subscribe_then_list() {
        let (ctx, chat) = setup();

        let res = handle(&ctx, "/subscribe", &["gold-prices"]).await;
        assert_eq!(res.command, Some(Command::Subscribe("gold-prices".parse().unwrap())));
        assert!(res.changed);
        assert!(res.reply_sent);

        let res = handle(&ctx, "list", &[]).await;
        assert!(!res.changed);
        assert_eq!(res.reply, "Your subscriptions:\n- gold-prices");

        assert_eq!(
            chat.sent_to("chat42"),
            vec![
                "Subscribed to gold-prices.".to_string(),
                "Your subscriptions:\n- gold-prices".to_string()
            ]
        );
    }

    #[actix_web::test]
    async fn repeated_commands_are_noops() {
        let (ctx, _) = setup();

        assert!(handle(&ctx, "subscribe", &["gold-prices"]).await.changed);
        let res = handle(&ctx, "subscribe", &["gold-prices"]).await;
        assert!(!res.changed);
        assert_eq!(res.reply, "You are already subscribed to gold-prices.");

        assert!(handle(&ctx, "unsubscribe", &["gold-prices"]).await.changed);
        let res = handle(&ctx, "unsubscribe", &["gold-prices"]).await;
        assert!(!res.changed);
        assert!(res.rejection.is_none());

        let res = handle(&ctx, "list", &[]).await;
        assert_eq!(
            res.reply,
            "You have no subscriptions. Use /subscribe <category> to add one."
        );
    }

    #[actix_web::test]
    async fn unknown_command_is_rejected_with_a_reply() {
        let (ctx, chat) = setup();

        let res = handle(&ctx, "foobar", &[]).await;
        assert!(res.command.is_none());
        assert!(!res.changed);
        assert!(res.reply_sent);
        assert!(matches!(
            res.rejection,
            Some(CalendarError::InvalidCommand(InvalidCommandError::Unknown(_)))
        ));
        assert_eq!(chat.sent_to("chat42").len(), 1);
        assert!(ctx
            .repos
            .subscribers
            .find_by_subscriber("chat42")
            .await
            .unwrap()
            .is_empty());

        let res = handle(&ctx, "subscribe", &[]).await;
        assert!(matches!(
            res.rejection,
            Some(CalendarError::InvalidCommand(
                InvalidCommandError::WrongArity { .. }
            ))
        ));
    }

    #[actix_web::test]
    async fn failed_reply_keeps_the_mutation() {
        let (ctx, chat) = setup();
        chat.fail_chat("chat42");

        let res = handle(&ctx, "subscribe", &["all"]).await;
        assert!(res.changed);
        assert!(!res.reply_sent);
        assert_eq!(
            ctx.repos
                .subscribers
                .find_by_subscription("all")
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
