use crate::subscriber::{InvalidSubscriptionError, Subscription};
use thiserror::Error;

/// The fixed vocabulary of chat commands understood by the bot
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Subscribe(Subscription),
    Unsubscribe(Subscription),
    List,
    Help,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidCommandError {
    #[error("Unknown command `{0}`")]
    Unknown(String),
    #[error("The `{command}` command expects {expected}, but {given} were given")]
    WrongArity {
        command: &'static str,
        expected: &'static str,
        given: usize,
    },
    #[error(transparent)]
    InvalidSubscription(#[from] InvalidSubscriptionError),
}

/// Strips the leading `/` and a trailing `@BotName` mention that chat
/// clients attach to commands, e.g. `/Subscribe@EconBot` -> `subscribe`.
pub fn normalize_command_name(command_name: &str) -> String {
    let name = command_name.trim();
    let name = name.strip_prefix('/').unwrap_or(name);
    let name = name.split('@').next().unwrap_or_default();
    name.to_lowercase()
}

impl Command {
    pub fn parse(command_name: &str, args: &[String]) -> Result<Self, InvalidCommandError> {
        let args = args
            .iter()
            .map(|arg| arg.trim())
            .filter(|arg| !arg.is_empty())
            .collect::<Vec<_>>();

        let given = args.len();
        let one_subscription =
            |command: &'static str| -> Result<Subscription, InvalidCommandError> {
                match args.as_slice() {
                    [subscription] => Ok(subscription.parse()?),
                    _ => Err(InvalidCommandError::WrongArity {
                        command,
                        expected: "exactly one subscription name",
                        given,
                    }),
                }
            };
        let no_args = |command: &'static str, parsed: Command| {
            if given == 0 {
                Ok(parsed)
            } else {
                Err(InvalidCommandError::WrongArity {
                    command,
                    expected: "no arguments",
                    given,
                })
            }
        };

        match normalize_command_name(command_name).as_str() {
            "subscribe" => one_subscription("subscribe").map(Self::Subscribe),
            "unsubscribe" => one_subscription("unsubscribe").map(Self::Unsubscribe),
            "list" => no_args("list", Self::List),
            "help" => no_args("help", Self::Help),
            "start" => no_args("start", Self::Help),
            _ => Err(InvalidCommandError::Unknown(command_name.trim().to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Subscribe(_) => "subscribe",
            Self::Unsubscribe(_) => "unsubscribe",
            Self::List => "list",
            Self::Help => "help",
        }
    }

    /// Whether executing this command can change the subscriber store
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Subscribe(_) | Self::Unsubscribe(_))
    }

    pub fn usage() -> &'static str {
        "Economic calendar bot. Available commands:\n\
         /subscribe <category> - get notified about upcoming events in a category (use `all` for every event)\n\
         /unsubscribe <category> - stop notifications for a category\n\
         /list - show your subscriptions\n\
         /help - show this message"
    }
}
