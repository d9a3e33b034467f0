mod command;
mod event;
mod occurrence;
mod shared;
mod subscriber;
mod timespan;

pub use command::{normalize_command_name, Command, InvalidCommandError};
pub use event::{format_event_key, CalendarEvent, EventKey, Impact};
pub use occurrence::{FeedOccurrence, InvalidOccurrenceError};
pub use shared::entity::{slugify, Entity};
pub use subscriber::{InvalidSubscriptionError, Subscriber, SubscriberKey, Subscription};
pub use timespan::{InvalidTimeSpanError, TimeSpan};
