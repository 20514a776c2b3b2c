//! Chat commands and handlers

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, warn};

use crate::domain::price::{PriceBook, PriceStore, ProductConfig};
use crate::infrastructure::chart::ChartRenderer;
use crate::shared::utils::format_price;

pub const HELP_TEXT: &str = "🤖 Price monitoring bot\n\
/price - current prices\n\
/chart - price charts\n\
/excel - download the price spreadsheet";

pub const NO_DATA: &str = "No data yet";

const STORE_UNAVAILABLE: &str = "Price history is unavailable right now";

/// Commands understood by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Price,
    Chart,
    Export,
    Unknown(String),
}

impl BotCommand {
    /// Parse `/command@botname args`. Plain text is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or_default().to_lowercase();

        Some(match name.as_str() {
            "start" | "help" => BotCommand::Start,
            "price" | "prices" => BotCommand::Price,
            "chart" => BotCommand::Chart,
            "excel" | "export" => BotCommand::Export,
            _ => BotCommand::Unknown(name),
        })
    }
}

/// What the bot sends back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Document(PathBuf),
}

/// Read-only command handling over fresh store snapshots
pub struct CommandHandler {
    products: Vec<ProductConfig>,
    store: Arc<dyn PriceStore>,
    charts: ChartRenderer,
    export_file: PathBuf,
}

impl CommandHandler {
    pub fn new(
        products: Vec<ProductConfig>,
        store: Arc<dyn PriceStore>,
        charts: ChartRenderer,
        export_file: PathBuf,
    ) -> Self {
        Self { products, store, charts, export_file }
    }

    pub fn handle(&self, command: &BotCommand) -> Vec<Reply> {
        match command {
            BotCommand::Start | BotCommand::Unknown(_) => vec![Reply::Text(HELP_TEXT.to_string())],
            BotCommand::Price => vec![Reply::Text(self.price_summary())],
            BotCommand::Chart => {
                let charts: Vec<Reply> = self.render_charts(None).into_iter().map(Reply::Document).collect();
                if charts.is_empty() {
                    vec![Reply::Text(NO_DATA.to_string())]
                } else {
                    charts
                }
            }
            BotCommand::Export => {
                if self.export_file.exists() {
                    vec![Reply::Document(self.export_file.clone())]
                } else {
                    vec![Reply::Text(NO_DATA.to_string())]
                }
            }
        }
    }

    /// One line per stored product with its last price
    pub fn price_summary(&self) -> String {
        let Some(book) = self.snapshot() else {
            return STORE_UNAVAILABLE.to_string();
        };

        let lines: Vec<String> = book
            .iter()
            .map(|(name, state)| match state.last_price {
                Some(price) => format!("{}: {}", name, format_price(price)),
                None => format!("{}: {}", name, NO_DATA),
            })
            .collect();

        if lines.is_empty() {
            NO_DATA.to_string()
        } else {
            lines.join("\n")
        }
    }

    /// Charts for configured products with history, optionally a single one
    pub fn render_charts(&self, only: Option<&str>) -> Vec<PathBuf> {
        let Some(book) = self.snapshot() else {
            return Vec::new();
        };

        self.products
            .iter()
            .filter(|p| only.map_or(true, |name| p.name == name))
            .filter_map(|p| {
                let history = book.get(&p.name).map(|s| s.history.as_slice()).unwrap_or_default();
                match self.charts.render(&p.name, history) {
                    Ok(path) => path,
                    Err(e) => {
                        warn!("Failed to render chart for {}: {}", p.name, e);
                        None
                    }
                }
            })
            .collect()
    }

    fn snapshot(&self) -> Option<PriceBook> {
        match self.store.load() {
            Ok(book) => Some(book),
            Err(e) => {
                error!("Failed to load price history: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::ProductState;
    use crate::infrastructure::storage::JsonFileStore;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn product(name: &str) -> ProductConfig {
        ProductConfig {
            name: name.to_string(),
            source_locator: "1".to_string(),
            target_price: 100,
        }
    }

    fn handler(dir: &TempDir, book: Option<PriceBook>) -> CommandHandler {
        let store = JsonFileStore::new(dir.path().join("prices.json"));
        if let Some(book) = book {
            store.save(&book).unwrap();
        }
        CommandHandler::new(
            vec![product("iphone"), product("kettle")],
            Arc::new(store),
            ChartRenderer::new(dir.path().join("charts")),
            dir.path().join("prices.csv"),
        )
    }

    fn book_with_iphone() -> PriceBook {
        let mut iphone = ProductState::default();
        iphone.record(52000, "01-03 09:00".to_string());
        iphone.record(49000, "01-03 10:00".to_string());
        let mut book = PriceBook::new();
        book.insert("iphone".to_string(), iphone);
        book
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("  /price  "), Some(BotCommand::Price));
        assert_eq!(BotCommand::parse("/chart@price_bot now"), Some(BotCommand::Chart));
        assert_eq!(BotCommand::parse("/EXCEL"), Some(BotCommand::Export));
        assert_eq!(BotCommand::parse("/export"), Some(BotCommand::Export));
        assert_eq!(BotCommand::parse("/dance"), Some(BotCommand::Unknown("dance".to_string())));
        assert_eq!(BotCommand::parse("hello"), None);
        assert_eq!(BotCommand::parse(""), None);
    }

    #[test]
    fn test_price_without_data() {
        let dir = tempdir().unwrap();
        let handler = handler(&dir, None);
        assert_eq!(handler.handle(&BotCommand::Price), vec![Reply::Text(NO_DATA.to_string())]);
    }

    #[test]
    fn test_price_summary() {
        let dir = tempdir().unwrap();
        let handler = handler(&dir, Some(book_with_iphone()));
        assert_eq!(handler.price_summary(), "iphone: 49000 ₽");
    }

    #[test]
    fn test_price_with_corrupt_store() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("prices.json"), "not json").unwrap();
        let handler = handler(&dir, None);
        assert_eq!(handler.price_summary(), STORE_UNAVAILABLE);
    }

    #[test]
    fn test_chart_only_for_products_with_history() {
        let dir = tempdir().unwrap();
        let handler = handler(&dir, Some(book_with_iphone()));

        let replies = handler.handle(&BotCommand::Chart);
        assert_eq!(replies, vec![Reply::Document(dir.path().join("charts/iphone_chart.svg"))]);
        assert!(handler.render_charts(Some("kettle")).is_empty());
    }

    #[test]
    fn test_chart_per_product_even_when_names_look_alike() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("prices.json"));
        let mut book = PriceBook::new();
        for (name, price) in [("iphone 15", 70000), ("iphone_15", 65000)] {
            let mut state = ProductState::default();
            state.record(price, "01-03 09:00".to_string());
            book.insert(name.to_string(), state);
        }
        store.save(&book).unwrap();
        let handler = CommandHandler::new(
            vec![product("iphone 15"), product("iphone_15")],
            Arc::new(store),
            ChartRenderer::new(dir.path().join("charts")),
            dir.path().join("prices.csv"),
        );

        let paths = handler.render_charts(None);
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0], paths[1]);
        assert!(fs::read_to_string(&paths[0]).unwrap().contains("Price history: iphone 15"));
        assert!(fs::read_to_string(&paths[1]).unwrap().contains("Price history: iphone_15"));
    }

    #[test]
    fn test_chart_without_data() {
        let dir = tempdir().unwrap();
        let handler = handler(&dir, None);
        assert_eq!(handler.handle(&BotCommand::Chart), vec![Reply::Text(NO_DATA.to_string())]);
    }

    #[test]
    fn test_export() {
        let dir = tempdir().unwrap();
        let handler = handler(&dir, None);
        assert_eq!(handler.handle(&BotCommand::Export), vec![Reply::Text(NO_DATA.to_string())]);

        fs::write(dir.path().join("prices.csv"), "Product,Price,Date\n").unwrap();
        assert_eq!(
            handler.handle(&BotCommand::Export),
            vec![Reply::Document(dir.path().join("prices.csv"))]
        );
    }

    #[test]
    fn test_unknown_command_gets_help() {
        let dir = tempdir().unwrap();
        let handler = handler(&dir, None);
        assert_eq!(
            handler.handle(&BotCommand::Unknown("dance".to_string())),
            vec![Reply::Text(HELP_TEXT.to_string())]
        );
    }
}
