//! Notification domain - alert delivery and chat boundary

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::domain::price::NotificationEvent;
use crate::shared::errors::NotifyError;
use crate::shared::utils::format_price;

/// Delivers alerts to a single preconfigured recipient.
///
/// Callers treat delivery as best-effort: an error is logged and dropped.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError>;
}

/// Text message received from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub update_id: i64,
    pub chat_id: String,
    pub text: String,
}

/// Two-way chat channel used for alerts and user commands
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Wait for messages newer than `offset`
    async fn poll(&self, offset: i64) -> Result<Vec<IncomingMessage>, NotifyError>;
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), NotifyError>;
    async fn send_file(&self, chat_id: &str, path: &Path) -> Result<(), NotifyError>;
}

/// Notifier that posts alerts into one chat
pub struct ChatNotifier {
    transport: Arc<dyn ChatTransport>,
    chat_id: String,
}

impl ChatNotifier {
    pub fn new(transport: Arc<dyn ChatTransport>, chat_id: impl Into<String>) -> Self {
        Self { transport, chat_id: chat_id.into() }
    }
}

#[async_trait]
impl Notifier for ChatNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        self.transport.send_text(&self.chat_id, &alert_message(event)).await
    }
}

/// Human-readable alert text for a price drop
pub fn alert_message(event: &NotificationEvent) -> String {
    format!(
        "🔥 {} dropped to {}\nTarget: {}",
        event.name,
        format_price(event.price),
        format_price(event.target_price)
    )
}
