//! Utility functions and helpers

use crate::shared::types::Price;

/// Timestamp format stored with each observation
pub const HISTORY_DATE_FORMAT: &str = "%d-%m %H:%M";

/// Timestamp format written to the export spreadsheet
pub const EXPORT_DATE_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Format price for chat messages
pub fn format_price(price: Price) -> String {
    format!("{} ₽", price)
}

/// File stem for a product name. Letters, digits and `-` are kept, every other
/// byte becomes `_XX` (hex). Distinct names never share a stem.
pub fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() || c == '-' {
            stem.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                stem.push_str(&format!("_{:02X}", byte));
            }
        }
    }
    stem
}
