//! Application wiring and CLI subcommands

use anyhow::{Context, Result};
use clap::Subcommand;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::{BotScheduler, CommandHandler, MonitorService, ScheduleCfg};
use crate::config::Config;
use crate::domain::notification::{ChatNotifier, ChatTransport, Notifier};
use crate::domain::price::{CycleReport, NotificationEvent, PriceMonitor, PriceStore};
use crate::infrastructure::chart::ChartRenderer;
use crate::infrastructure::storage::{CsvExporter, JsonFileStore};
use crate::infrastructure::telegram::TelegramClient;
use crate::infrastructure::wildberries::WildberriesCardClient;
use crate::shared::errors::NotifyError;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the bot: scheduled price checks and chat commands
    Run,
    /// Run a single price check, send alerts and exit
    Check,
    /// Print the last known prices
    Prices,
    /// Render price charts and print their paths
    Chart {
        /// Only this product
        #[arg(long)]
        product: Option<String>,
    },
}

/// Notifier used when no chat is configured for a one-shot check
struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        warn!("No chat configured, alert not sent: {} at {}", event.name, event.price);
        Ok(())
    }
}

pub async fn run(cfg: Config, command: Command) -> Result<()> {
    cfg.validate().context("invalid configuration")?;
    info!("Monitoring {} products, history in {}", cfg.products.len(), cfg.storage.data_file.display());

    match command {
        Command::Run => run_bot(cfg).await,
        Command::Check => {
            let report = check_once(cfg).await?;
            print_report(&report);
            Ok(())
        }
        Command::Prices => {
            println!("{}", command_handler(&cfg, store(&cfg)).price_summary());
            Ok(())
        }
        Command::Chart { product } => {
            let paths = command_handler(&cfg, store(&cfg)).render_charts(product.as_deref());
            if paths.is_empty() {
                println!("No data yet");
            }
            for path in paths {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

async fn run_bot(cfg: Config) -> Result<()> {
    let credentials = cfg.telegram_credentials().context("telegram is not configured")?;
    let telegram: Arc<dyn ChatTransport> = Arc::new(
        TelegramClient::new(
            &cfg.telegram.api_url,
            &credentials.token,
            std::time::Duration::from_secs(cfg.telegram.poll_timeout_secs),
        )
        .context("failed to create telegram client")?,
    );

    let store = store(&cfg);
    let notifier = Arc::new(ChatNotifier::new(telegram.clone(), credentials.chat_id.clone()));
    let service = monitor_service(&cfg, store.clone(), notifier)?;
    let commands = command_handler(&cfg, store);

    let scheduler = BotScheduler::new(
        telegram,
        credentials.chat_id,
        service,
        commands,
        ScheduleCfg {
            check_interval: cfg.monitor.check_interval(),
            first_check_delay: cfg.monitor.first_check_delay(),
        },
    );
    scheduler.run(shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
    }
}

async fn check_once(cfg: Config) -> Result<CycleReport> {
    let notifier: Arc<dyn Notifier> = match cfg.telegram_credentials() {
        Ok(credentials) => {
            let telegram = TelegramClient::new(
                &cfg.telegram.api_url,
                &credentials.token,
                std::time::Duration::from_secs(cfg.telegram.poll_timeout_secs),
            )
            .context("failed to create telegram client")?;
            Arc::new(ChatNotifier::new(Arc::new(telegram), credentials.chat_id))
        }
        Err(e) => {
            warn!("Alerts will only be logged: {}", e);
            Arc::new(LogNotifier)
        }
    };

    let service = monitor_service(&cfg, store(&cfg), notifier)?;
    service
        .check_prices()
        .await
        .context("price check failed, see log for details")
}

fn store(cfg: &Config) -> Arc<dyn PriceStore> {
    Arc::new(JsonFileStore::new(&cfg.storage.data_file))
}

fn monitor_service(
    cfg: &Config,
    store: Arc<dyn PriceStore>,
    notifier: Arc<dyn Notifier>,
) -> Result<MonitorService> {
    let feed = WildberriesCardClient::new(
        cfg.monitor.api_url.clone(),
        cfg.monitor.request_timeout(),
        &cfg.monitor.user_agent,
    )
    .context("failed to create price client")?;
    let exporter = CsvExporter::new(&cfg.storage.export_file);

    let monitor = PriceMonitor::new(Arc::new(feed), store, Arc::new(exporter));
    Ok(MonitorService::new(monitor, cfg.products.clone(), notifier))
}

fn command_handler(cfg: &Config, store: Arc<dyn PriceStore>) -> CommandHandler {
    CommandHandler::new(
        cfg.products.clone(),
        store,
        ChartRenderer::new(&cfg.storage.chart_dir),
        cfg.storage.export_file.clone(),
    )
}

fn print_report(report: &CycleReport) {
    println!("Checked: {}", report.checked);
    for (name, price) in &report.changed {
        println!("Changed: {} -> {}", name, price);
    }
    for name in &report.fetch_failures {
        println!("Failed:  {}", name);
    }
    for event in &report.events {
        println!("Alert:   {} at {} (target {})", event.name, event.price, event.target_price);
    }
}
