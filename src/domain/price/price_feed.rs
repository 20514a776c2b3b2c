//! Price feed interface

use async_trait::async_trait;

use crate::shared::errors::FetchError;
use crate::shared::types::Price;

/// Source of a product's current price.
///
/// Implementations perform a single bounded request per call and map every
/// failure (network, status, response shape) into [`FetchError`].
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_price(&self, source_locator: &str) -> Result<Price, FetchError>;
}
