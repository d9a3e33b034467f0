mod inmemory;

use anyhow::anyhow;
pub use inmemory::{InMemoryChatPlatform, SentMessage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

/// Outbound side of the chat platform
#[async_trait::async_trait]
pub trait IChatPlatform: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramBotApi {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramBotApi {
    pub fn new(base_url: String, token: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

#[async_trait::async_trait]
impl IChatPlatform for TelegramBotApi {
    async fn send_message(&self, chat_id: &str, text: &str) -> anyhow::Result<()> {
        let body = SendMessageRequest {
            chat_id,
            text,
            disable_web_page_preview: true,
        };
        let res = match self
            .client
            .post(&format!("{}/bot{}/sendMessage", self.base_url, self.token))
            .json(&body)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                // The request url contains the token, so it is stripped from the error
                let e = e.without_url();
                error!(
                    "[Network Error] Telegram sendMessage error. Error message: {:?}",
                    e
                );
                return Err(anyhow::Error::new(e));
            }
        };

        // Telegram reports failures both through the status code and the `ok` flag
        let status = res.status();
        let res = res
            .json::<TelegramResponse>()
            .await
            .map_err(|e| anyhow::Error::new(e.without_url()))?;
        if !status.is_success() || !res.ok {
            let description = res.description.unwrap_or_default();
            error!(
                "[Unexpected Response] Telegram sendMessage to chat: {} failed with status: {}. Description: {}",
                chat_id, status, description
            );
            return Err(anyhow!(
                "Telegram sendMessage failed with status {}: {}",
                status,
                description
            ));
        }
        Ok(())
    }
}
