use crate::shared::entity::{slugify, Entity};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

const MAX_SUBSCRIPTION_LEN: usize = 64;

/// A validated name of something a chat can subscribe to, e.g. a calendar
/// category like `gold-prices` or the wildcard `all`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Subscription(String);

#[derive(Error, Debug, PartialEq)]
pub enum InvalidSubscriptionError {
    #[error("Subscription name must not be empty")]
    Empty,
    #[error("Subscription name `{0}` is longer than 64 characters")]
    TooLong(String),
    #[error(
        "Subscription name `{0}` may only contain letters, digits, `-` and `_`, and must start with a letter or digit"
    )]
    Malformed(String),
}

impl Subscription {
    /// The subscription that matches every category
    pub const ALL: &'static str = "all";

    pub fn all() -> Self {
        Self(Self::ALL.to_string())
    }

    /// Derives a subscription from free text such as a feed category.
    pub fn from_category(category: &str) -> Result<Self, InvalidSubscriptionError> {
        let mut slug = slugify(category);
        slug.truncate(MAX_SUBSCRIPTION_LEN);
        let slug = slug.trim_end_matches('-').to_string();
        slug.parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::ALL
    }
}

impl FromStr for Subscription {
    type Err = InvalidSubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        let mut chars = name.chars();
        match chars.next() {
            None => return Err(InvalidSubscriptionError::Empty),
            Some(first) if !first.is_ascii_alphanumeric() => {
                return Err(InvalidSubscriptionError::Malformed(name))
            }
            _ => (),
        }
        if name.len() > MAX_SUBSCRIPTION_LEN {
            return Err(InvalidSubscriptionError::TooLong(name));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(InvalidSubscriptionError::Malformed(name));
        }
        Ok(Self(name))
    }
}

impl Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberKey {
    pub subscription: String,
    pub subscriber: String,
}

/// A `Subscriber` is a chat that receives notifications for events
/// in the given `subscription`.
///
/// The pair (`subscription`, `subscriber`) is unique and the record is never
/// updated after it has been created, only deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Partition key: the category being subscribed to
    pub subscription: String,
    /// Sort key: the chat that should be notified
    pub subscriber: String,
    /// Timestamp in millis of the first subscribe command for this pair
    pub created: i64,
}

impl Subscriber {
    pub fn new(subscription: &Subscription, subscriber: &str, created: i64) -> Self {
        Self {
            subscription: subscription.as_str().to_string(),
            subscriber: subscriber.to_string(),
            created,
        }
    }
}

impl Entity for Subscriber {
    type Key = SubscriberKey;

    fn key(&self) -> SubscriberKey {
        SubscriberKey {
            subscription: self.subscription.clone(),
            subscriber: self.subscriber.clone(),
        }
    }
}
