use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{fs, time::Duration};

use crate::domain::price::ProductConfig;
use crate::infrastructure::telegram::DEFAULT_BOT_API_URL;
use crate::infrastructure::wildberries::{DEFAULT_CARD_API_URL, DEFAULT_USER_AGENT};
use crate::shared::errors::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "Config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramCfg {
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub api_url: String,
    pub poll_timeout_secs: u64,
}

impl Default for TelegramCfg {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            api_url: DEFAULT_BOT_API_URL.to_string(),
            poll_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorCfg {
    pub check_interval_secs: u64,
    pub first_check_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub api_url: String,
    pub user_agent: String,
}

impl Default for MonitorCfg {
    fn default() -> Self {
        Self {
            check_interval_secs: 3600,
            first_check_delay_secs: 10,
            request_timeout_secs: 10,
            api_url: DEFAULT_CARD_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl MonitorCfg {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn first_check_delay(&self) -> Duration {
        Duration::from_secs(self.first_check_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageCfg {
    pub data_file: PathBuf,
    pub export_file: PathBuf,
    pub chart_dir: PathBuf,
}

impl Default for StorageCfg {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("prices.json"),
            export_file: PathBuf::from("prices.csv"),
            chart_dir: PathBuf::from("charts"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramCfg,
    #[serde(default)]
    pub monitor: MonitorCfg,
    #[serde(default)]
    pub storage: StorageCfg,
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Resolved bot credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub token: String,
    pub chat_id: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&s)
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Secrets from the environment win over the file.
    /// `TELEGRAM_TOKEN` / `TOKEN`, `TELEGRAM_CHAT_ID` / `CHAT_ID`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("TELEGRAM_TOKEN").or_else(|| non_empty("TOKEN")) {
            self.telegram.token = Some(token);
        }
        if let Some(chat_id) = non_empty("TELEGRAM_CHAT_ID").or_else(|| non_empty("CHAT_ID")) {
            self.telegram.chat_id = Some(chat_id);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.products.is_empty() {
            return Err(ConfigError::Missing("products"));
        }

        let mut names = HashSet::new();
        for product in &self.products {
            if product.name.trim().is_empty() {
                return Err(ConfigError::Invalid("product name must not be empty".to_string()));
            }
            if !names.insert(product.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate product name: {}", product.name)));
            }
            if product.source_locator.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("product {} has no url", product.name)));
            }
            if product.target_price == 0 {
                return Err(ConfigError::Invalid(format!(
                    "product {} must have a positive target_price",
                    product.name
                )));
            }
        }

        if self.monitor.check_interval_secs == 0 {
            return Err(ConfigError::Invalid("monitor.check_interval_secs must be positive".to_string()));
        }
        if self.monitor.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("monitor.request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn telegram_credentials(&self) -> Result<TelegramCredentials, ConfigError> {
        let token = self.telegram.token.clone().ok_or(ConfigError::Missing("telegram.token"))?;
        let chat_id = self.telegram.chat_id.clone().ok_or(ConfigError::Missing("telegram.chat_id"))?;
        Ok(TelegramCredentials { token, chat_id })
    }
}
