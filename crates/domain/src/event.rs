use crate::shared::entity::Entity;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub entity_type: String,
    pub event_key: String,
}

impl Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.event_key)
    }
}

/// How much the market is expected to move on an occurrence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    Low,
    Medium,
    High,
    Holiday,
    #[default]
    Unknown,
}

impl Impact {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "holiday" | "non-economic" => Self::Holiday,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Holiday => "Holiday",
            Self::Unknown => "Unknown",
        }
    }
}

/// A single scheduled occurrence on the economic calendar.
///
/// Display fields are owned by the refresh job and may change between
/// refreshes. Delivery state (`notified`, `delivered`, `delivered_at`) is
/// owned by the push job and must never be reset by a refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Partition key: the category this occurrence is pushed under
    pub entity_type: String,
    /// Sort key: `{source_id}@{scheduled time}`, stable across refreshes
    pub event_key: String,
    pub source_id: String,
    pub title: String,
    pub country: String,
    pub impact: Impact,
    /// Timestamp in millis at which the occurrence is scheduled
    pub scheduled_at: i64,
    pub forecast: Option<String>,
    pub previous: Option<String>,
    pub actual: Option<String>,
    /// Subscribers that have already received a notification for this occurrence
    pub notified: Vec<String>,
    /// Set once every subscriber has been notified without failures
    pub delivered: bool,
    pub delivered_at: Option<i64>,
    pub created: i64,
    pub updated: i64,
}

/// Formats the sort key of an occurrence, e.g. `E1@2024-01-01T10:00`.
pub fn format_event_key(source_id: &str, scheduled_at: i64) -> String {
    match Utc.timestamp_millis_opt(scheduled_at).single() {
        Some(dt) => format!("{}@{}", source_id, dt.format("%Y-%m-%dT%H:%M")),
        None => format!("{}@{}", source_id, scheduled_at),
    }
}

impl CalendarEvent {
    pub fn has_same_display_fields(&self, other: &CalendarEvent) -> bool {
        self.title == other.title
            && self.country == other.country
            && self.impact == other.impact
            && self.scheduled_at == other.scheduled_at
            && self.forecast == other.forecast
            && self.previous == other.previous
            && self.actual == other.actual
    }

    /// Copies the display fields of `other` onto `self`, leaving the
    /// delivery state untouched.
    pub fn apply_display_fields(&mut self, other: &CalendarEvent, now: i64) {
        self.title = other.title.clone();
        self.country = other.country.clone();
        self.impact = other.impact;
        self.scheduled_at = other.scheduled_at;
        self.forecast = other.forecast.clone();
        self.previous = other.previous.clone();
        self.actual = other.actual.clone();
        self.updated = now;
    }

    pub fn is_notified(&self, subscriber: &str) -> bool {
        self.notified.iter().any(|s| s == subscriber)
    }

    pub fn notification_text(&self) -> String {
        let when = Utc
            .timestamp_millis_opt(self.scheduled_at)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| self.scheduled_at.to_string());

        let mut text = format!(
            "[{}] {}: {}\n{}",
            self.impact.as_str(),
            self.country,
            self.title,
            when
        );
        let figures = [
            ("Forecast", &self.forecast),
            ("Previous", &self.previous),
            ("Actual", &self.actual),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
        .collect::<Vec<_>>();
        if !figures.is_empty() {
            text.push('\n');
            text.push_str(&figures.join(" | "));
        }
        text
    }
}

impl Entity for CalendarEvent {
    type Key = EventKey;

    fn key(&self) -> EventKey {
        EventKey {
            entity_type: self.entity_type.clone(),
            event_key: self.event_key.clone(),
        }
    }
}
