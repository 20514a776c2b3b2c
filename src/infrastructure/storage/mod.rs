//! File-backed persistence: price history and spreadsheet export

pub mod json_store;
pub mod csv_export;

pub use json_store::JsonFileStore;
pub use csv_export::CsvExporter;
