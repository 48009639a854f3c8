//! Scan scheduler runner.
//!
//! The scheduler is an actor driven by a command channel:
//! 1. `StartSession` spawns a recurring scan task for one session
//! 2. `StopSession` cancels that task via the session registry
//! 3. `TriggerScan` runs an on-demand scan, optionally with its own
//!    keywords and window (the `fetch` command)
//! 4. `SetInterval` re-arms a running session with a new period
//!
//! Every article, diagnostic, and status text is chunked to the message
//! limit and handed to the outbound report channel in scan order. The
//! seen-link set is guarded by a single mutex held for the duration of
//! each scan, so concurrent sessions cannot double-report a link.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock, mpsc, watch};
use tokio::time::interval;
use tracing::{debug, info, warn};

use super::sessions::{SessionHandle, SessionId, SessionRegistry};
use crate::config::{MAX_MESSAGE_LENGTH, WatchConfig};
use crate::feed::{ArticleCandidate, FeedFetcher, KeywordSet, SeenLinks, TimeWindow, scan};
use crate::format::split_message;

/// Commands that can be sent to the scheduler.
#[derive(Debug, Clone)]
pub enum SchedulerCommand {
    /// Start recurring scans for a session.
    StartSession(SessionId),

    /// Stop recurring scans for a session.
    StopSession(SessionId),

    /// Run one scan now, optionally overriding keywords and window.
    TriggerScan {
        session: SessionId,
        keywords: Option<Vec<String>>,
        window: Option<TimeWindow>,
    },

    /// Change the scan period of a running session.
    SetInterval {
        session: SessionId,
        period: Duration,
    },

    /// Stop all sessions and exit the scheduler.
    Shutdown,
}

/// One outgoing message, already chunked to the message limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReport {
    /// Destination session.
    pub session: SessionId,

    /// Message text, at most [`MAX_MESSAGE_LENGTH`] characters.
    pub text: String,
}

/// Whether a scan was requested by a user or by the recurring timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanKind {
    Scheduled,
    Manual,
}

/// Recurring feed scan scheduler.
#[derive(Clone)]
pub struct ScanScheduler {
    /// Feed fetch capability.
    fetcher: Arc<dyn FeedFetcher>,

    /// Watchlist configuration.
    config: Arc<RwLock<WatchConfig>>,

    /// Links already reported this session.
    seen: Arc<Mutex<SeenLinks>>,

    /// Running recurring tasks by session.
    sessions: Arc<RwLock<SessionRegistry>>,

    /// Report sink.
    outbound: mpsc::Sender<OutboundReport>,
}

impl ScanScheduler {
    /// Creates a new scan scheduler.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        config: Arc<RwLock<WatchConfig>>,
        seen: Arc<Mutex<SeenLinks>>,
        sessions: Arc<RwLock<SessionRegistry>>,
        outbound: mpsc::Sender<OutboundReport>,
    ) -> Self {
        Self {
            fetcher,
            config,
            seen,
            sessions,
            outbound,
        }
    }

    /// Runs the scheduler loop until `Shutdown` or channel closure.
    pub async fn run(&self, mut rx: mpsc::Receiver<SchedulerCommand>) {
        info!("Scan scheduler started");

        while let Some(command) = rx.recv().await {
            match command {
                SchedulerCommand::StartSession(session) => self.start_session(session).await,
                SchedulerCommand::StopSession(session) => self.stop_session(session).await,
                SchedulerCommand::TriggerScan {
                    session,
                    keywords,
                    window,
                } => {
                    self.run_scan(session, ScanKind::Manual, keywords, window)
                        .await;
                }
                SchedulerCommand::SetInterval { session, period } => {
                    self.set_interval(session, period).await;
                }
                SchedulerCommand::Shutdown => {
                    info!("Scheduler shutting down");
                    self.sessions.write().await.clear();
                    break;
                }
            }
        }
    }

    /// Starts a recurring scan task for a session.
    async fn start_session(&self, session: SessionId) {
        if self.sessions.read().await.contains(session) {
            self.deliver(session, "Bot is already running.").await;
            return;
        }

        let period = Duration::from_secs(self.config.read().await.scan_interval_secs);
        info!(
            "Starting scheduled scans for session {} every {}",
            session,
            format_period(period)
        );
        self.deliver(
            session,
            &format!(
                "Scheduled feed scan started, running every {}.",
                format_period(period)
            ),
        )
        .await;

        // Register before spawning so the first tick never races the
        // registry entry.
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.sessions
            .write()
            .await
            .insert(session, SessionHandle::new(shutdown_tx, period));
        self.spawn_scan_loop(session, period, shutdown_rx);
    }

    /// Spawns the per-session loop; the first scan fires immediately.
    fn spawn_scan_loop(
        &self,
        session: SessionId,
        period: Duration,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let scheduler = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("Scheduled scan tick for session {}", session);
                        scheduler
                            .run_scan(session, ScanKind::Scheduled, None, None)
                            .await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("Scan loop for session {} stopped", session);
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Stops a session's recurring task.
    async fn stop_session(&self, session: SessionId) {
        if self.sessions.write().await.remove(session) {
            info!("Stopped scheduled scans for session {}", session);
            self.deliver(session, "Scheduled scans stopped.").await;
        } else {
            self.deliver(session, "Bot is not running.").await;
        }
    }

    /// Re-arms a running session with a new period. Sessions that are
    /// not running pick the configured interval up on their next start.
    async fn set_interval(&self, session: SessionId, period: Duration) {
        let restarted = {
            let mut sessions = self.sessions.write().await;
            if sessions.remove(session) {
                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                sessions.insert(session, SessionHandle::new(shutdown_tx, period));
                self.spawn_scan_loop(session, period, shutdown_rx);
                true
            } else {
                false
            }
        };

        if restarted {
            info!(
                "Session {} re-armed with period {}",
                session,
                format_period(period)
            );
        }
    }

    /// Runs one scan and delivers its results.
    ///
    /// The watchlist is snapshotted under a brief read lock before the
    /// scan so commands stay responsive while feeds are fetched; only
    /// the seen mutex is held across the network awaits, to keep
    /// check-then-insert atomic per link.
    async fn run_scan(
        &self,
        session: SessionId,
        kind: ScanKind,
        keyword_override: Option<Vec<String>>,
        window_override: Option<TimeWindow>,
    ) {
        let now = Utc::now();

        let (sources, window, mut keywords) = {
            let config = self.config.read().await;
            let window = window_override.unwrap_or(config.scan_window);
            let keywords = match keyword_override {
                Some(words) => KeywordSet::from(words),
                None => config.keywords.clone(),
            };
            (config.sources.clone(), window, keywords)
        };

        let result = {
            let mut seen = self.seen.lock().await;
            scan(
                self.fetcher.as_ref(),
                &sources,
                &mut keywords,
                window,
                &mut seen,
                now,
            )
            .await
        };

        match result {
            Ok(outcome) => {
                for diagnostic in &outcome.diagnostics {
                    self.deliver(session, diagnostic).await;
                }
                for article in &outcome.articles {
                    self.deliver(session, &format_article(article)).await;
                }
                if outcome.articles.is_empty() && kind == ScanKind::Manual {
                    self.deliver(session, "No articles found with the specified keywords.")
                        .await;
                }
            }
            Err(e) => {
                warn!("Scan for session {} failed: {}", session, e);
                self.deliver(session, &format!("Scan failed: {e}")).await;
            }
        }
    }

    /// Chunks a message and hands it to the report sink.
    async fn deliver(&self, session: SessionId, text: &str) {
        for chunk in split_message(text, MAX_MESSAGE_LENGTH) {
            let report = OutboundReport {
                session,
                text: chunk,
            };
            if self.outbound.send(report).await.is_err() {
                warn!("Report sink closed, dropping message for session {}", session);
                return;
            }
        }
    }
}

impl std::fmt::Debug for ScanScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanScheduler").finish_non_exhaustive()
    }
}

/// Formats one matched article for delivery.
fn format_article(article: &ArticleCandidate) -> String {
    format!("Found article: {}\nLink: {}", article.title, article.link)
}

/// Formats a period for user-facing messages.
fn format_period(period: Duration) -> String {
    let secs = period.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedEntry, FetchError, ParsedFeed};
    use async_trait::async_trait;
    use tokio::time::timeout;

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    struct SingleFeedFetcher {
        feed: ParsedFeed,
    }

    #[async_trait]
    impl FeedFetcher for SingleFeedFetcher {
        async fn fetch(&self, _url: &str) -> Result<ParsedFeed, FetchError> {
            Ok(self.feed.clone())
        }
    }

    fn test_feed() -> ParsedFeed {
        ParsedFeed {
            title: None,
            entries: vec![FeedEntry {
                title: "Putin speaks".to_owned(),
                link: "https://n.example/l1".to_owned(),
                summary: None,
                body: None,
                published: Some(Utc::now()),
            }],
        }
    }

    fn test_config() -> WatchConfig {
        WatchConfig {
            sources: vec!["https://n.example/feed".to_owned()],
            keywords: KeywordSet::from(vec!["Putin".to_owned()]),
            scan_window: TimeWindow::Today,
            scan_interval_secs: 3600,
        }
    }

    struct Harness {
        tx: mpsc::Sender<SchedulerCommand>,
        outbound: mpsc::Receiver<OutboundReport>,
        config: Arc<RwLock<WatchConfig>>,
        sessions: Arc<RwLock<SessionRegistry>>,
        task: tokio::task::JoinHandle<()>,
    }

    fn spawn_scheduler(feed: ParsedFeed, config: WatchConfig) -> Harness {
        spawn_with_fetcher(Arc::new(SingleFeedFetcher { feed }), config)
    }

    fn spawn_with_fetcher(fetcher: Arc<dyn FeedFetcher>, config: WatchConfig) -> Harness {
        let (tx, rx) = mpsc::channel(16);
        let (outbound_tx, outbound_rx) = mpsc::channel(64);
        let config = Arc::new(RwLock::new(config));
        let sessions = Arc::new(RwLock::new(SessionRegistry::new()));

        let scheduler = ScanScheduler::new(
            fetcher,
            Arc::clone(&config),
            Arc::new(Mutex::new(SeenLinks::new())),
            Arc::clone(&sessions),
            outbound_tx,
        );
        let task = tokio::spawn(async move { scheduler.run(rx).await });

        Harness {
            tx,
            outbound: outbound_rx,
            config,
            sessions,
            task,
        }
    }

    async fn recv(harness: &mut Harness) -> OutboundReport {
        timeout(RECV_TIMEOUT, harness.outbound.recv())
            .await
            .expect("timed out waiting for report")
            .expect("outbound channel closed")
    }

    #[tokio::test]
    async fn test_manual_trigger_reports_articles() {
        let mut harness = spawn_scheduler(test_feed(), test_config());

        harness
            .tx
            .send(SchedulerCommand::TriggerScan {
                session: 42,
                keywords: None,
                window: None,
            })
            .await
            .unwrap();

        let report = recv(&mut harness).await;
        assert_eq!(report.session, 42);
        assert_eq!(
            report.text,
            "Found article: Putin speaks\nLink: https://n.example/l1"
        );

        harness.tx.send(SchedulerCommand::Shutdown).await.unwrap();
        harness.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_manual_trigger_without_matches_says_so() {
        let mut harness = spawn_scheduler(test_feed(), test_config());

        harness
            .tx
            .send(SchedulerCommand::TriggerScan {
                session: 1,
                keywords: Some(vec!["Antarctica".to_owned()]),
                window: None,
            })
            .await
            .unwrap();

        let report = recv(&mut harness).await;
        assert_eq!(report.text, "No articles found with the specified keywords.");

        harness.tx.send(SchedulerCommand::Shutdown).await.unwrap();
        harness.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_start_session_registers_and_scans() {
        let mut harness = spawn_scheduler(test_feed(), test_config());

        harness
            .tx
            .send(SchedulerCommand::StartSession(7))
            .await
            .unwrap();

        let started = recv(&mut harness).await;
        assert!(started.text.contains("Scheduled feed scan started"));

        // First tick fires immediately and reports the matching entry.
        let article = recv(&mut harness).await;
        assert!(article.text.contains("Putin speaks"));
        assert!(harness.sessions.read().await.contains(7));

        harness
            .tx
            .send(SchedulerCommand::StopSession(7))
            .await
            .unwrap();
        let stopped = recv(&mut harness).await;
        assert_eq!(stopped.text, "Scheduled scans stopped.");
        assert!(harness.sessions.read().await.is_empty());

        harness.tx.send(SchedulerCommand::Shutdown).await.unwrap();
        harness.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_start_twice_reports_already_running() {
        let mut harness = spawn_scheduler(test_feed(), test_config());

        harness
            .tx
            .send(SchedulerCommand::StartSession(7))
            .await
            .unwrap();
        let _started = recv(&mut harness).await;
        let _article = recv(&mut harness).await;

        harness
            .tx
            .send(SchedulerCommand::StartSession(7))
            .await
            .unwrap();
        let again = recv(&mut harness).await;
        assert_eq!(again.text, "Bot is already running.");

        harness.tx.send(SchedulerCommand::Shutdown).await.unwrap();
        harness.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_reports_not_running() {
        let mut harness = spawn_scheduler(test_feed(), test_config());

        harness
            .tx
            .send(SchedulerCommand::StopSession(9))
            .await
            .unwrap();
        let report = recv(&mut harness).await;
        assert_eq!(report.text, "Bot is not running.");

        harness.tx.send(SchedulerCommand::Shutdown).await.unwrap();
        harness.task.await.unwrap();
    }

    struct StalledFetcher;

    #[async_trait]
    impl FeedFetcher for StalledFetcher {
        async fn fetch(&self, _url: &str) -> Result<ParsedFeed, FetchError> {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(ParsedFeed::default())
        }
    }

    #[tokio::test]
    async fn test_config_stays_readable_while_scan_awaits_fetch() {
        let mut harness = spawn_with_fetcher(Arc::new(StalledFetcher), test_config());

        harness
            .tx
            .send(SchedulerCommand::TriggerScan {
                session: 1,
                keywords: None,
                window: None,
            })
            .await
            .unwrap();

        // Give the scan time to reach the fetch await.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let guard = timeout(Duration::from_millis(500), harness.config.read())
            .await
            .expect("config locked during an in-flight scan");
        assert_eq!(guard.source_count(), 1);
        drop(guard);

        let report = recv(&mut harness).await;
        assert_eq!(report.text, "No articles found with the specified keywords.");

        harness.tx.send(SchedulerCommand::Shutdown).await.unwrap();
        harness.task.await.unwrap();
    }

    #[test]
    fn test_format_period() {
        assert_eq!(format_period(Duration::from_secs(900)), "15m");
        assert_eq!(format_period(Duration::from_secs(45)), "45s");
        assert_eq!(format_period(Duration::from_secs(5400)), "1h 30m");
    }

    #[test]
    fn test_format_article() {
        let article = ArticleCandidate {
            title: "Title".to_owned(),
            link: "https://n.example/a".to_owned(),
            published: None,
        };
        assert_eq!(
            format_article(&article),
            "Found article: Title\nLink: https://n.example/a"
        );
    }
}
