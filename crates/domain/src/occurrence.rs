use crate::{
    event::{format_event_key, CalendarEvent, Impact},
    shared::entity::slugify,
    subscriber::Subscription,
};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of the external economic calendar feed, as published.
///
/// The feed does not always carry an id or a category, so both are derived
/// from the other fields when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedOccurrence {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub category: Option<String>,
    /// RFC 3339 date time, e.g. `2024-01-01T10:00:00-05:00`
    pub date: String,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub forecast: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidOccurrenceError {
    #[error("Feed occurrence has no title")]
    MissingTitle,
    #[error("Feed occurrence `{title}` has an invalid date: `{date}`")]
    InvalidDate { title: String, date: String },
    #[error("Unable to derive a category for feed occurrence `{0}`")]
    MissingCategory(String),
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

impl FeedOccurrence {
    pub fn scheduled_at(&self) -> Result<i64, InvalidOccurrenceError> {
        DateTime::parse_from_rfc3339(self.date.trim())
            .map(|dt| dt.timestamp_millis())
            .map_err(|_| InvalidOccurrenceError::InvalidDate {
                title: self.title.clone(),
                date: self.date.clone(),
            })
    }

    pub fn source_id(&self) -> Result<String, InvalidOccurrenceError> {
        if let Some(id) = non_empty(&self.id) {
            return Ok(id);
        }
        let title = slugify(&self.title);
        if title.is_empty() {
            return Err(InvalidOccurrenceError::MissingTitle);
        }
        let country = slugify(&self.country);
        if country.is_empty() {
            Ok(title)
        } else {
            Ok(format!("{}-{}", country, title))
        }
    }

    /// The category the occurrence is stored and pushed under: the explicit
    /// category when given, otherwise the country.
    pub fn entity_type(&self) -> Result<Subscription, InvalidOccurrenceError> {
        let raw = non_empty(&self.category).unwrap_or_else(|| self.country.clone());
        Subscription::from_category(&raw)
            .ok()
            .filter(|subscription| !subscription.is_wildcard())
            .ok_or_else(|| InvalidOccurrenceError::MissingCategory(self.title.clone()))
    }

    pub fn to_event(&self, now: i64) -> Result<CalendarEvent, InvalidOccurrenceError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(InvalidOccurrenceError::MissingTitle);
        }
        let scheduled_at = self.scheduled_at()?;
        let source_id = self.source_id()?;
        let entity_type = self.entity_type()?;

        Ok(CalendarEvent {
            entity_type: entity_type.as_str().to_string(),
            event_key: format_event_key(&source_id, scheduled_at),
            source_id,
            title: title.to_string(),
            country: self.country.trim().to_string(),
            impact: self
                .impact
                .as_deref()
                .map(Impact::parse)
                .unwrap_or_default(),
            scheduled_at,
            forecast: non_empty(&self.forecast),
            previous: non_empty(&self.previous),
            actual: non_empty(&self.actual),
            notified: Vec::new(),
            delivered: false,
            delivered_at: None,
            created: now,
            updated: now,
        })
    }
}
