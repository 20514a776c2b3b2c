//! Price domain - price monitoring and history

mod price_monitor;
mod price_feed;
mod price_analyzer;
mod price_store;
mod price_export;

pub use price_monitor::PriceMonitor;
pub use price_feed::PriceFeed;
pub use price_export::PriceExporter;
pub use price_analyzer::{PriceAnalyzer, PriceChange};
pub use price_store::PriceStore;

use crate::shared::types::Price;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Monitored product, loaded once from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    #[serde(rename = "url")]
    pub source_locator: String,
    pub target_price: Price,
}

/// One recorded price point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub price: Price,
    #[serde(rename = "date")]
    pub timestamp: String,
}

/// Last known price and observation history of one product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductState {
    #[serde(default)]
    pub history: Vec<Observation>,
    #[serde(default)]
    pub last_price: Option<Price>,
}

impl ProductState {
    /// Record a new price. History is append-only and `last_price`
    /// always mirrors its tail.
    pub fn record(&mut self, price: Price, timestamp: String) {
        self.last_price = Some(price);
        self.history.push(Observation { price, timestamp });
    }
}

/// Whole contents of the price store, keyed by product name
pub type PriceBook = BTreeMap<String, ProductState>;

/// Raised when a changed price is at or below the product target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub name: String,
    pub price: Price,
    pub target_price: Price,
}

/// Outcome of one monitoring cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub fetch_failures: Vec<String>,
    pub changed: Vec<(String, Price)>,
    pub events: Vec<NotificationEvent>,
}
