use crate::feishu::message::{Card, OutboundMessage};
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Outbound transport. Delivery is fire-and-forget: failures are logged
/// and swallowed, never retried, and never propagated to inbound handlers.
#[derive(Debug, Clone)]
pub struct FeishuClient {
    http: reqwest::Client,
    webhook_url: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
}

impl FeishuClient {
    pub fn new(webhook_url: String) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(FeishuClient { http, webhook_url })
    }

    pub async fn send(&self, message: &OutboundMessage) -> bool {
        if self.webhook_url.is_empty() {
            tracing::debug!("Webhook URL not configured, dropping outbound message");
            return false;
        }

        let response = match self.http.post(&self.webhook_url).json(message).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to deliver message: {}", e);
                return false;
            }
        };

        match response.json::<SendResponse>().await {
            Ok(body) if body.code == 0 => true,
            Ok(body) => {
                tracing::error!("Webhook rejected message: code={} msg={}", body.code, body.msg);
                false
            }
            Err(e) => {
                tracing::error!("Failed to decode webhook response: {}", e);
                false
            }
        }
    }

    pub async fn send_text(&self, content: &str) -> bool {
        self.send(&OutboundMessage::text(content)).await
    }

    pub async fn send_rich_text(&self, title: &str, content: &str) -> bool {
        self.send(&OutboundMessage::rich_text(title, content)).await
    }

    pub async fn send_card(&self, card: &Card) -> bool {
        match OutboundMessage::interactive(card) {
            Ok(message) => self.send(&message).await,
            Err(e) => {
                tracing::error!("Failed to serialize card: {}", e);
                false
            }
        }
    }
}
