//! Wildberries card API price fetcher

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::price::PriceFeed;
use crate::shared::errors::FetchError;
use crate::shared::types::Price;

pub const DEFAULT_CARD_API_URL: &str = "https://card.wb.ru/cards/v1/detail";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

/// Delivery region the card API prices against
const DEST_REGION: &str = "-1257786";

/// Card API response envelope
#[derive(Debug, Deserialize)]
struct CardResponse {
    data: CardData,
}

#[derive(Debug, Deserialize)]
struct CardData {
    products: Vec<CardProduct>,
}

/// Only the fields we rely on; the rest of the card is ignored
#[derive(Debug, Deserialize)]
struct CardProduct {
    #[serde(rename = "salePriceU")]
    sale_price_u: i64,
}

/// Wildberries card API client
pub struct WildberriesCardClient {
    http_client: Client,
    api_url: String,
}

impl WildberriesCardClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into(),
        })
    }

    /// Request the product card and pull the sale price out of it
    async fn fetch_card(&self, article: &str) -> Result<Price, FetchError> {
        debug!("Fetching Wildberries card {} from {}", article, self.api_url);

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[
                ("appType", "1"),
                ("curr", "rub"),
                ("dest", DEST_REGION),
                ("nm", article),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        parse_card_response(&body)
    }
}

#[async_trait]
impl PriceFeed for WildberriesCardClient {
    async fn fetch_price(&self, source_locator: &str) -> Result<Price, FetchError> {
        let article = article_id(source_locator)?;
        self.fetch_card(&article).await
    }
}

/// Extract the article number from a product page URL.
///
/// `https://www.wildberries.ru/catalog/574048913/detail.aspx` yields `574048913`.
/// A bare article number is accepted as-is.
pub fn article_id(locator: &str) -> Result<String, FetchError> {
    let locator = locator.trim();
    if !locator.is_empty() && locator.chars().all(|c| c.is_ascii_digit()) {
        return Ok(locator.to_string());
    }

    let segments: Vec<&str> = locator.split('/').collect();
    let article: String = segments
        .len()
        .checked_sub(2)
        .map(|i| segments[i].chars().filter(|c| c.is_ascii_digit()).collect())
        .unwrap_or_default();

    if article.is_empty() {
        return Err(FetchError::InvalidLocator(locator.to_string()));
    }
    Ok(article)
}

/// Validate the card response; `salePriceU` is in kopecks.
pub fn parse_card_response(body: &str) -> Result<Price, FetchError> {
    let card: CardResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Schema(e.to_string()))?;

    let product = card.data.products.first().ok_or(FetchError::ProductMissing)?;
    let price = product.sale_price_u / 100;
    if price <= 0 {
        return Err(FetchError::InvalidPrice(price));
    }
    Ok(price as Price)
}
