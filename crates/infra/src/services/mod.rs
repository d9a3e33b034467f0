mod calendar_feed;
mod telegram;

pub use calendar_feed::{HttpCalendarFeed, ICalendarFeed, InMemoryCalendarFeed};
pub use telegram::{IChatPlatform, InMemoryChatPlatform, SentMessage, TelegramBotApi};
