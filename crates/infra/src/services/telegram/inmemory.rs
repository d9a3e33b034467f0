use super::IChatPlatform;
use anyhow::anyhow;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: String,
    pub text: String,
}

/// Chat platform double that records every delivered message.
/// Chats can be made unreachable to simulate delivery failures.
pub struct InMemoryChatPlatform {
    sent: Mutex<Vec<SentMessage>>,
    failing_chats: Mutex<Vec<String>>,
}

impl InMemoryChatPlatform {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_chats: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_chat(&self, chat_id: &str) {
        self.failing_chats.lock().unwrap().push(chat_id.to_string());
    }

    pub fn restore_chat(&self, chat_id: &str) {
        self.failing_chats.lock().unwrap().retain(|c| c != chat_id);
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.text.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl IChatPlatform for InMemoryChatPlatform {
    async fn send_message(&self, chat_id: &str, text: &str) -> anyhow::Result<()> {
        if self.failing_chats.lock().unwrap().iter().any(|c| c == chat_id) {
            return Err(anyhow!("Chat: {} is unreachable", chat_id));
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}
