//! Common types used across the application

use chrono::{DateTime, Local};

/// Price in whole currency units (roubles).
pub type Price = u64;

/// Source of "now" for observation timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
