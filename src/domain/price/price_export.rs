//! Price export interface

use chrono::{DateTime, Local};

use crate::shared::errors::ExportError;
use crate::shared::types::Price;

/// Receives every recorded price change, e.g. to keep a spreadsheet in sync.
pub trait PriceExporter: Send + Sync {
    fn record(&self, name: &str, price: Price, at: DateTime<Local>) -> Result<(), ExportError>;
}
