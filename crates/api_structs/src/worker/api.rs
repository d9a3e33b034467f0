use crate::dtos::{CommandOutcomeDTO, PushReportDTO, RefreshReportDTO};
use serde::{Deserialize, Serialize};

pub const UPDATE_EVENTS_TRIGGER: &str = "update-events";
pub const PUSH_UPDATES_TRIGGER: &str = "push-updates";

/// One command from the chat platform, as put on the command queue
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandMessage {
    pub chat_id: String,
    pub command_name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Payload of the scheduled triggers, e.g. `{ "event": "push-updates" }`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScheduledTrigger {
    pub event: String,
}

impl ScheduledTrigger {
    pub fn update_events() -> Self {
        Self {
            event: UPDATE_EVENTS_TRIGGER.into(),
        }
    }

    pub fn push_updates() -> Self {
        Self {
            event: PUSH_UPDATES_TRIGGER.into(),
        }
    }
}

pub mod invoke {
    use super::*;

    /// Any json payload is accepted and routed by its shape
    pub type RequestBody = serde_json::Value;

    #[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
    #[serde(tag = "trigger", rename_all = "camelCase")]
    pub enum APIResponse {
        Command(CommandOutcomeDTO),
        RefreshTick(RefreshReportDTO),
        PushTick(PushReportDTO),
    }
}
