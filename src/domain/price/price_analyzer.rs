//! Price change detection

use crate::shared::types::Price;
use super::ProductState;

/// Result of comparing a fetched price with the recorded state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceChange {
    Unchanged,
    First(Price),
    Changed { old: Price, new: Price },
}

/// Analyzes price observations
pub struct PriceAnalyzer;

impl PriceAnalyzer {
    pub fn compare(&self, state: Option<&ProductState>, fetched: Price) -> PriceChange {
        match state.and_then(|s| s.last_price) {
            None => PriceChange::First(fetched),
            Some(old) if old == fetched => PriceChange::Unchanged,
            Some(old) => PriceChange::Changed { old, new: fetched },
        }
    }

    /// Inclusive: a price equal to the target counts.
    pub fn is_target_hit(&self, price: Price, target_price: Price) -> bool {
        price <= target_price
    }

    pub fn calculate_price_change(&self, old: Price, new: Price) -> f64 {
        if old > 0 {
            ((new as f64 - old as f64) / old as f64) * 100.0
        } else {
            0.0
        }
    }
}
