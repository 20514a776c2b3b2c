//! Telegram Bot API transport

pub mod bot_client;

pub use bot_client::{TelegramClient, DEFAULT_BOT_API_URL};
