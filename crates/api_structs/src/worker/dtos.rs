use serde::{Deserialize, Serialize};

/// Result of processing one inbound chat command
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcomeDTO {
    pub chat_id: String,
    /// Normalised name of the executed command, absent when the command was rejected
    pub command: Option<String>,
    pub accepted: bool,
    /// Whether the subscriber store was modified
    pub changed: bool,
    pub reply: String,
    pub reply_sent: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReportDTO {
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub pruned: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFailureDTO {
    pub entity_type: String,
    pub event_key: String,
    /// Absent when the subscribers of the event could not be resolved
    pub subscriber: Option<String>,
    pub reason: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushReportDTO {
    pub due_events: usize,
    pub notifications_sent: usize,
    pub already_notified: usize,
    pub delivered_events: usize,
    pub failures: Vec<DeliveryFailureDTO>,
}
