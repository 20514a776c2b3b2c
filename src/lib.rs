//! Pricewatch - product price monitor
//! Tracks price history per product and alerts when a price drops to its target

pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::{BotScheduler, MonitorService};
pub use config::Config;
pub use domain::price::{PriceMonitor, PriceFeed, PriceStore};
pub use domain::notification::Notifier;
