//! JSON file price store with atomic saves

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::domain::price::{PriceBook, PriceStore};
use crate::shared::errors::StoreError;

/// Price book kept in a single pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "prices.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn write_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Write { path: self.display_path(), source }
    }
}

impl PriceStore for JsonFileStore {
    fn load(&self) -> Result<PriceBook, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No price store at {}, starting empty", self.path.display());
                return Ok(PriceBook::new());
            }
            Err(source) => return Err(StoreError::Read { path: self.display_path(), source }),
        };

        serde_json::from_str(&content)
            .map_err(|source| StoreError::Corrupt { path: self.display_path(), source })
    }

    /// Write to a sibling temp file, then rename it over the store.
    fn save(&self, book: &PriceBook) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(book)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        let tmp = self.tmp_path();
        let mut file = File::create(&tmp).map_err(|e| self.write_err(e))?;
        file.write_all(json.as_bytes()).map_err(|e| self.write_err(e))?;
        file.sync_all().map_err(|e| self.write_err(e))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(|e| self.write_err(e))?;
        debug!("Saved {} products to {}", book.len(), self.path.display());
        Ok(())
    }
}
