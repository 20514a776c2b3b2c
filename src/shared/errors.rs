//! Error handling for the application

use thiserror::Error;

/// Price fetch errors. Always recovered per product by the monitor.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid source locator: {0}")]
    InvalidLocator(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Price API returned status: {0}")]
    Status(reqwest::StatusCode),

    #[error("Unexpected response shape: {0}")]
    Schema(String),

    #[error("Product not found in price response")]
    ProductMissing,

    #[error("Non-positive price in response: {0}")]
    InvalidPrice(i64),
}

/// Price store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read price store {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Price store {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write price store {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize price store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Spreadsheet export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Chart rendering errors
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart drawing failed: {0}")]
    Drawing(String),
}

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bot API rejected request: {0}")]
    Rejected(String),

    #[error("Attachment error: {0}")]
    Attachment(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}
