//! Durable price store interface

use crate::shared::errors::StoreError;
use super::PriceBook;

/// Whole-record persistence of the price book.
///
/// `load` must return an empty book when nothing has been stored yet.
/// `save` replaces the stored record in full and must not leave a
/// truncated record behind on failure.
pub trait PriceStore: Send + Sync {
    fn load(&self) -> Result<PriceBook, StoreError>;
    fn save(&self, book: &PriceBook) -> Result<(), StoreError>;
}
