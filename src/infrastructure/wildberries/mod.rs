//! Wildberries product-card price source

pub mod card_client;

pub use card_client::{WildberriesCardClient, DEFAULT_CARD_API_URL, DEFAULT_USER_AGENT};
