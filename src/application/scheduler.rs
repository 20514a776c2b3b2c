//! Bot event loop: scheduled price checks interleaved with chat commands

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::notification::{ChatTransport, IncomingMessage};
use super::commands::{BotCommand, CommandHandler, Reply};
use super::services::MonitorService;

/// Back-off after a failed poll
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct ScheduleCfg {
    pub check_interval: Duration,
    pub first_check_delay: Duration,
}

/// Single-task loop: a price check runs to completion before the next
/// command is handled, and checks never overlap.
pub struct BotScheduler {
    transport: Arc<dyn ChatTransport>,
    chat_id: String,
    service: MonitorService,
    commands: CommandHandler,
    schedule: ScheduleCfg,
}

impl BotScheduler {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        chat_id: impl Into<String>,
        service: MonitorService,
        commands: CommandHandler,
        schedule: ScheduleCfg,
    ) -> Self {
        Self {
            transport,
            chat_id: chat_id.into(),
            service,
            commands,
            schedule,
        }
    }

    /// Run until `shutdown` completes
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "🚀 Bot started: checking {} products every {}s, first check in {}s",
            self.service.products().len(),
            self.schedule.check_interval.as_secs(),
            self.schedule.first_check_delay.as_secs()
        );

        let mut ticker = interval_at(
            Instant::now() + self.schedule.first_check_delay,
            self.schedule.check_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut offset = 0;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.service.check_prices().await;
                }
                polled = self.transport.poll(offset) => match polled {
                    Ok(messages) => {
                        for message in messages {
                            offset = offset.max(message.update_id + 1);
                            self.handle_message(&message).await;
                        }
                    }
                    Err(e) => {
                        warn!("⚠️ Failed to poll for commands: {}", e);
                        sleep(POLL_RETRY_DELAY).await;
                    }
                },
                _ = &mut shutdown => {
                    info!("🛑 Shutting down");
                    break;
                }
            }
        }
    }

    /// Answer one incoming message. Only the configured chat is served.
    pub async fn handle_message(&self, message: &IncomingMessage) {
        if message.chat_id != self.chat_id {
            debug!("Ignoring message from chat {}", message.chat_id);
            return;
        }
        let Some(command) = BotCommand::parse(&message.text) else {
            return;
        };

        debug!("Handling command {:?}", command);
        for reply in self.commands.handle(&command) {
            let sent = match &reply {
                Reply::Text(text) => self.transport.send_text(&self.chat_id, text).await,
                Reply::Document(path) => self.transport.send_file(&self.chat_id, path).await,
            };
            if let Err(e) = sent {
                warn!("⚠️ Failed to reply to {:?}: {}", command, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::{PriceExporter, PriceFeed, PriceMonitor, PriceStore, ProductConfig};
    use crate::domain::notification::ChatNotifier;
    use crate::infrastructure::chart::ChartRenderer;
    use crate::infrastructure::storage::JsonFileStore;
    use crate::shared::errors::{ExportError, FetchError, NotifyError};
    use crate::shared::types::Price;
    use async_trait::async_trait;
    use chrono::{DateTime, Local};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};
    use tokio::sync::oneshot;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        Text(String, String),
        File(String, PathBuf),
    }

    #[derive(Default)]
    struct OutboxTransport {
        sent: Mutex<Vec<Sent>>,
    }

    #[async_trait]
    impl ChatTransport for OutboxTransport {
        async fn poll(&self, _offset: i64) -> Result<Vec<IncomingMessage>, NotifyError> {
            Ok(Vec::new())
        }

        async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(Sent::Text(chat_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn send_file(&self, chat_id: &str, path: &Path) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(Sent::File(chat_id.to_string(), path.to_path_buf()));
            Ok(())
        }
    }

    struct FixedFeed(Price);

    #[async_trait]
    impl PriceFeed for FixedFeed {
        async fn fetch_price(&self, _source_locator: &str) -> Result<Price, FetchError> {
            Ok(self.0)
        }
    }

    struct NullExporter;

    impl PriceExporter for NullExporter {
        fn record(&self, _: &str, _: Price, _: DateTime<Local>) -> Result<(), ExportError> {
            Ok(())
        }
    }

    /// Logs each fetch and takes `delay` to answer
    struct TimedFeed {
        delay: Duration,
        log: Log,
    }

    #[async_trait]
    impl PriceFeed for TimedFeed {
        async fn fetch_price(&self, _source_locator: &str) -> Result<Price, FetchError> {
            self.log.lock().unwrap().push("fetch start".to_string());
            sleep(self.delay).await;
            self.log.lock().unwrap().push("fetch end".to_string());
            Ok(49000)
        }
    }

    type Log = Arc<Mutex<Vec<String>>>;

    /// Each poll holds for the long-poll timeout, then hands over queued messages
    struct LongPollTransport {
        inbox: Mutex<Vec<IncomingMessage>>,
        log: Log,
    }

    #[async_trait]
    impl ChatTransport for LongPollTransport {
        async fn poll(&self, _offset: i64) -> Result<Vec<IncomingMessage>, NotifyError> {
            sleep(Duration::from_secs(30)).await;
            Ok(self.inbox.lock().unwrap().drain(..).collect())
        }

        async fn send_text(&self, _chat_id: &str, text: &str) -> Result<(), NotifyError> {
            self.log.lock().unwrap().push(format!("send: {}", text));
            Ok(())
        }

        async fn send_file(&self, _chat_id: &str, path: &Path) -> Result<(), NotifyError> {
            self.log.lock().unwrap().push(format!("file: {}", path.display()));
            Ok(())
        }
    }

    fn scheduler(dir: &TempDir, transport: Arc<OutboxTransport>) -> BotScheduler {
        scheduler_with(dir, Arc::new(FixedFeed(49000)), transport)
    }

    fn scheduler_with(dir: &TempDir, feed: Arc<dyn PriceFeed>, transport: Arc<dyn ChatTransport>) -> BotScheduler {
        let store = Arc::new(JsonFileStore::new(dir.path().join("prices.json")));
        let products = vec![ProductConfig {
            name: "iphone".to_string(),
            source_locator: "574048913".to_string(),
            target_price: 50000,
        }];

        let monitor = PriceMonitor::new(feed, store.clone(), Arc::new(NullExporter));
        let notifier = Arc::new(ChatNotifier::new(transport.clone(), "42"));
        let service = MonitorService::new(monitor, products.clone(), notifier);
        let commands = CommandHandler::new(
            products,
            store,
            ChartRenderer::new(dir.path().join("charts")),
            dir.path().join("prices.csv"),
        );

        BotScheduler::new(
            transport,
            "42",
            service,
            commands,
            ScheduleCfg {
                check_interval: Duration::from_secs(3600),
                first_check_delay: Duration::from_secs(10),
            },
        )
    }

    fn count(log: &Log, entry: &str) -> usize {
        log.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    fn message(chat_id: &str, text: &str) -> IncomingMessage {
        IncomingMessage { update_id: 1, chat_id: chat_id.to_string(), text: text.to_string() }
    }

    #[tokio::test]
    async fn test_replies_to_configured_chat() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(OutboxTransport::default());
        let scheduler = scheduler(&dir, transport.clone());

        scheduler.handle_message(&message("42", "/price")).await;

        let sent = transport.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![Sent::Text("42".to_string(), "No data yet".to_string())]);
    }

    #[tokio::test]
    async fn test_ignores_other_chats_and_plain_text() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(OutboxTransport::default());
        let scheduler = scheduler(&dir, transport.clone());

        scheduler.handle_message(&message("13", "/price")).await;
        scheduler.handle_message(&message("42", "what is the price?")).await;

        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_then_commands_see_fresh_history() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(OutboxTransport::default());
        let scheduler = scheduler(&dir, transport.clone());

        scheduler.service.check_prices().await.unwrap();
        scheduler.handle_message(&message("42", "/price")).await;
        scheduler.handle_message(&message("42", "/chart")).await;

        let sent = transport.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 3);
        assert!(matches!(&sent[0], Sent::Text(chat, text) if chat == "42" && text.contains("iphone dropped to 49000")));
        assert_eq!(sent[1], Sent::Text("42".to_string(), "iphone: 49000 ₽".to_string()));
        assert_eq!(sent[2], Sent::File("42".to_string(), dir.path().join("charts/iphone_chart.svg")));

        let book = JsonFileStore::new(dir.path().join("prices.json")).load().unwrap();
        assert_eq!(book["iphone"].history.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checks_follow_schedule() {
        let dir = tempdir().unwrap();
        let log = Log::default();
        let feed = Arc::new(TimedFeed { delay: Duration::ZERO, log: log.clone() });
        let transport = Arc::new(LongPollTransport { inbox: Mutex::default(), log: log.clone() });
        let scheduler = scheduler_with(&dir, feed, transport);
        let (stop, stopped) = oneshot::channel::<()>();

        let timeline = async {
            sleep(Duration::from_secs(9)).await;
            assert_eq!(count(&log, "fetch end"), 0, "no check before the first delay");

            sleep(Duration::from_secs(2)).await;
            assert_eq!(count(&log, "fetch end"), 1, "first check right after the delay");

            sleep(Duration::from_secs(3598)).await;
            assert_eq!(count(&log, "fetch end"), 1);

            sleep(Duration::from_secs(2)).await;
            assert_eq!(count(&log, "fetch end"), 2, "next check one interval later");

            let _ = stop.send(());
        };

        tokio::join!(
            scheduler.run(async {
                let _ = stopped.await;
            }),
            timeline
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_waits_for_running_check() {
        let dir = tempdir().unwrap();
        let log = Log::default();
        let feed = Arc::new(TimedFeed { delay: Duration::from_secs(60), log: log.clone() });
        let transport = Arc::new(LongPollTransport {
            inbox: Mutex::new(vec![message("42", "/price")]),
            log: log.clone(),
        });
        let scheduler = scheduler_with(&dir, feed, transport);
        let (stop, stopped) = oneshot::channel::<()>();

        let timeline = async {
            sleep(Duration::from_secs(200)).await;
            let _ = stop.send(());
        };

        tokio::join!(
            scheduler.run(async {
                let _ = stopped.await;
            }),
            timeline
        );

        let log = log.lock().unwrap().clone();
        assert_eq!(log.len(), 4, "unexpected log: {:?}", log);
        assert_eq!(log[0], "fetch start");
        assert_eq!(log[1], "fetch end");
        assert!(log[2].starts_with("send: 🔥 iphone dropped to 49000"));
        assert_eq!(log[3], "send: iphone: 49000 ₽");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_shutdown_signal() {
        let dir = tempdir().unwrap();
        let log = Log::default();
        let feed = Arc::new(TimedFeed { delay: Duration::ZERO, log: log.clone() });
        let transport = Arc::new(LongPollTransport { inbox: Mutex::default(), log: log.clone() });
        let scheduler = scheduler_with(&dir, feed, transport);

        scheduler.run(sleep(Duration::from_secs(5))).await;
        assert!(log.lock().unwrap().is_empty());
    }
}
