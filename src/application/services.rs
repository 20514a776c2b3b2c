//! Application services and use cases

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::notification::Notifier;
use crate::domain::price::{CycleReport, PriceMonitor, ProductConfig};

/// Runs price checks and dispatches the resulting alerts
pub struct MonitorService {
    monitor: PriceMonitor,
    products: Vec<ProductConfig>,
    notifier: Arc<dyn Notifier>,
}

impl MonitorService {
    pub fn new(monitor: PriceMonitor, products: Vec<ProductConfig>, notifier: Arc<dyn Notifier>) -> Self {
        Self { monitor, products, notifier }
    }

    pub fn products(&self) -> &[ProductConfig] {
        &self.products
    }

    /// One scheduled check. Never fails: every error is logged here.
    ///
    /// Alerts are only sent once the cycle's changes were saved; an unsaved
    /// change is detected again on the next check.
    pub async fn check_prices(&self) -> Option<CycleReport> {
        info!("🔍 Checking prices for {} products", self.products.len());

        let report = match self.monitor.run_cycle(&self.products).await {
            Ok(report) => report,
            Err(e) => {
                error!("❌ Price check aborted, history not updated: {}", e);
                return None;
            }
        };

        for event in &report.events {
            if let Err(e) = self.notifier.notify(event).await {
                warn!("⚠️ Failed to deliver alert for {}: {}", event.name, e);
            }
        }

        info!(
            "✅ Price check done: {} checked, {} changed, {} failed, {} alerts",
            report.checked,
            report.changed.len(),
            report.fetch_failures.len(),
            report.events.len()
        );
        Some(report)
    }
}
