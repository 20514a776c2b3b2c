//! Price monitoring cycle: fetch, compare, record, decide notification

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::shared::errors::StoreError;
use crate::shared::types::{Clock, SystemClock};
use crate::shared::utils::HISTORY_DATE_FORMAT;
use super::{
    CycleReport, NotificationEvent, PriceAnalyzer, PriceChange, PriceExporter, PriceFeed,
    PriceStore, ProductConfig,
};

/// Runs check cycles over the configured products.
///
/// The store is loaded at the start of every cycle and saved exactly once at
/// the end, so nothing is cached between cycles.
pub struct PriceMonitor {
    feed: Arc<dyn PriceFeed>,
    store: Arc<dyn PriceStore>,
    exporter: Arc<dyn PriceExporter>,
    clock: Arc<dyn Clock>,
    analyzer: PriceAnalyzer,
}

impl PriceMonitor {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        store: Arc<dyn PriceStore>,
        exporter: Arc<dyn PriceExporter>,
    ) -> Self {
        Self {
            feed,
            store,
            exporter,
            clock: Arc::new(SystemClock),
            analyzer: PriceAnalyzer,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one cycle and return the notifications it produced.
    ///
    /// Fetch and export failures are logged and skipped. Only a store
    /// load/save failure aborts the cycle.
    pub async fn run_cycle(&self, products: &[ProductConfig]) -> Result<CycleReport, StoreError> {
        let mut book = self.store.load()?;
        let mut report = CycleReport::default();

        for product in products {
            report.checked += 1;

            let fetched = match self.feed.fetch_price(&product.source_locator).await {
                Ok(price) => price,
                Err(e) => {
                    warn!("Failed to fetch price for {}: {}", product.name, e);
                    report.fetch_failures.push(product.name.clone());
                    continue;
                }
            };

            let change = self.analyzer.compare(book.get(&product.name), fetched);
            let price = match change {
                PriceChange::Unchanged => {
                    debug!("{}: price unchanged at {}", product.name, fetched);
                    continue;
                }
                PriceChange::First(price) => {
                    info!("{}: first observed price {}", product.name, price);
                    price
                }
                PriceChange::Changed { old, new } => {
                    info!(
                        "{}: price changed {} -> {} ({:+.2}%)",
                        product.name,
                        old,
                        new,
                        self.analyzer.calculate_price_change(old, new)
                    );
                    new
                }
            };

            let now = self.clock.now();
            book.entry(product.name.clone())
                .or_default()
                .record(price, now.format(HISTORY_DATE_FORMAT).to_string());
            report.changed.push((product.name.clone(), price));

            if let Err(e) = self.exporter.record(&product.name, price, now) {
                warn!("Failed to export price for {}: {}", product.name, e);
            }

            if self.analyzer.is_target_hit(price, product.target_price) {
                info!(
                    "{}: price {} is at or below target {}",
                    product.name, price, product.target_price
                );
                report.events.push(NotificationEvent {
                    name: product.name.clone(),
                    price,
                    target_price: product.target_price,
                });
            }
        }

        self.store.save(&book)?;
        Ok(report)
    }
}
