//! Telegram Bot API client

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::domain::notification::{ChatTransport, IncomingMessage};
use crate::shared::errors::NotifyError;

pub const DEFAULT_BOT_API_URL: &str = "https://api.telegram.org";

/// Slack on top of the long-poll timeout before the HTTP request gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Bot API response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Minimal Telegram Bot API client
pub struct TelegramClient {
    http_client: Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, NotifyError> {
        let http_client = Client::builder().timeout(poll_timeout + POLL_GRACE).build()?;

        Ok(Self {
            http_client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout,
        })
    }

    /// Long-poll for text messages after `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<IncomingMessage>, NotifyError> {
        let url = format!("{}/getUpdates", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.poll_timeout.as_secs().to_string()),
                ("allowed_updates", "[\"message\"]".to_string()),
            ])
            .send()
            .await?;

        let updates: Vec<Update> = read_response(response).await?;
        Ok(text_messages(updates))
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/sendMessage", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&SendMessage { chat_id, text })
            .send()
            .await?;

        let _: serde_json::Value = read_response(response).await?;
        debug!("Sent message to chat {}", chat_id);
        Ok(())
    }

    pub async fn send_document(&self, chat_id: &str, path: &Path) -> Result<(), NotifyError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", Part::bytes(bytes).file_name(file_name));

        let url = format!("{}/sendDocument", self.base_url);
        let response = self.http_client.post(&url).multipart(form).send().await?;

        let _: serde_json::Value = read_response(response).await?;
        debug!("Sent document {} to chat {}", path.display(), chat_id);
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn poll(&self, offset: i64) -> Result<Vec<IncomingMessage>, NotifyError> {
        self.get_updates(offset).await
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        self.send_message(chat_id, text).await
    }

    async fn send_file(&self, chat_id: &str, path: &Path) -> Result<(), NotifyError> {
        self.send_document(chat_id, path).await
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, NotifyError> {
    let status = response.status();
    let body = response.text().await?;
    parse_api_response(&body).map_err(|reason| match reason {
        NotifyError::Rejected(desc) => NotifyError::Rejected(format!("{} ({})", desc, status)),
        other => other,
    })
}

fn parse_api_response<T: DeserializeOwned>(body: &str) -> Result<T, NotifyError> {
    let envelope: ApiResponse<T> =
        serde_json::from_str(body).map_err(|e| NotifyError::Rejected(format!("malformed response: {}", e)))?;

    match (envelope.ok, envelope.result) {
        (true, Some(result)) => Ok(result),
        _ => Err(NotifyError::Rejected(
            envelope.description.unwrap_or_else(|| "no description".to_string()),
        )),
    }
}

/// Keep updates that carry a text message; others only advance the offset.
fn text_messages(updates: Vec<Update>) -> Vec<IncomingMessage> {
    updates
        .into_iter()
        .map(|update| {
            let (chat_id, text) = update
                .message
                .map(|m| (m.chat.id.to_string(), m.text.unwrap_or_default()))
                .unwrap_or_default();
            IncomingMessage { update_id: update.update_id, chat_id, text }
        })
        .collect()
}
