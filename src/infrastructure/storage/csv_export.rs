//! Spreadsheet export of price changes

use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::domain::price::PriceExporter;
use crate::shared::errors::ExportError;
use crate::shared::types::Price;
use crate::shared::utils::EXPORT_DATE_FORMAT;

const HEADER: [&str; 3] = ["Product", "Price", "Date"];

/// Append-only spreadsheet of every recorded price change
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceExporter for CsvExporter {
    fn record(&self, name: &str, price: Price, at: DateTime<Local>) -> Result<(), ExportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(HEADER)?;
        }
        writer.write_record([
            name.to_string(),
            price.to_string(),
            at.format(EXPORT_DATE_FORMAT).to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}
