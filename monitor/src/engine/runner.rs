//! Monitor loop
//!
//! One long-lived task. While not running it parks on the handle; while
//! running, each cycle is:
//!
//! config snapshot → fetch → (failure: count, maybe auto-stop)
//!                         → (success: mirror + detached persist → stats →
//!                            display → alert) → interruptible sleep

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::logger::{TraceId, child_span, root_span};
use tokio::time::sleep;
use tracing::{Instrument, Span, debug, error, info, warn};

use crate::alert::{AlertDispatcher, AlertOutcome, Notifier, evaluate};
use crate::config::{Config, ConfigSource};
use crate::engine::profit::derived_profit;
use crate::engine::state::MonitorHandle;
use crate::error::ConfigError;
use crate::history::{HistoryMirror, HistoryStore, Sample};
use crate::sinks::{DisplaySink, LocalAlert, LogSink};
use crate::source::{PriceSource, ensure_finite};
use crate::stats::{StatsResult, compute_stats};

/// Pause requests are honoured at this granularity while sleeping.
const SLEEP_STEP: Duration = Duration::from_secs(1);

/// External capabilities the loop is wired to.
pub struct Collaborators {
    pub config: Arc<dyn ConfigSource>,
    pub source: Arc<dyn PriceSource>,
    pub store: Arc<dyn HistoryStore>,
    pub notifier: Arc<dyn Notifier>,
    pub local_alert: Arc<dyn LocalAlert>,
    pub display: Arc<dyn DisplaySink>,
    pub log: Arc<dyn LogSink>,
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleReport {
    /// Configuration no longer validates; the monitor paused itself.
    Skipped(ConfigError),
    FetchFailed {
        interval: Duration,
        auto_stopped: bool,
    },
    Sampled {
        interval: Duration,
        price: f64,
        profit: f64,
        stats: Option<StatsResult>,
        outcome: AlertOutcome,
    },
}

impl CycleReport {
    fn interval(&self) -> Option<Duration> {
        match self {
            CycleReport::Skipped(_) => None,
            CycleReport::FetchFailed { interval, .. } | CycleReport::Sampled { interval, .. } => {
                Some(*interval)
            }
        }
    }
}

pub struct Monitor {
    handle: MonitorHandle,
    config: Arc<dyn ConfigSource>,
    source: Arc<dyn PriceSource>,
    store: Arc<dyn HistoryStore>,
    display: Arc<dyn DisplaySink>,
    log: Arc<dyn LogSink>,
    alerts: AlertDispatcher,
    history: HistoryMirror,
}

impl Monitor {
    /// Builds the loop around a mirror seeded with `loaded` (the result of
    /// the start-up [`HistoryStore::load`]).
    pub fn new(c: Collaborators, loaded: Vec<Sample>) -> (Self, MonitorHandle) {
        let handle = MonitorHandle::new(Arc::clone(&c.config), Arc::clone(&c.log));

        let mut history = HistoryMirror::default();
        history.seed(loaded);

        let monitor = Self {
            handle: handle.clone(),
            alerts: AlertDispatcher::new(c.notifier, c.local_alert, Arc::clone(&c.log)),
            config: c.config,
            source: c.source,
            store: c.store,
            display: c.display,
            log: c.log,
            history,
        };

        (monitor, handle)
    }

    pub fn handle(&self) -> &MonitorHandle {
        &self.handle
    }

    pub fn history(&self) -> &HistoryMirror {
        &self.history
    }

    /// Runs for the life of the process.
    pub async fn run(mut self) {
        info!(seeded = self.history.len(), "monitor loop ready");

        loop {
            if !self.handle.is_running() {
                self.handle.wait_for_start().await;
                continue;
            }

            let report = self.run_cycle().await;
            debug!(?report, "poll cycle finished");

            if let Some(interval) = report.interval() {
                self.sleep_unless_paused(interval).await;
            }
        }
    }

    /// One poll cycle against a fresh configuration snapshot.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let cfg = match self.config.current().validate() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(error = %e, "configuration became invalid while running");
                self.log.append(&e.to_string());
                self.handle.stop("invalid configuration");
                return CycleReport::Skipped(e);
            }
        };

        let trace_id = TraceId::new();
        self.poll(cfg)
            .instrument(root_span("poll_cycle", &trace_id))
            .await
    }

    async fn poll(&mut self, cfg: Config) -> CycleReport {
        let interval = cfg.interval();

        let price = match self.source.fetch_price().await.and_then(ensure_finite) {
            Ok(price) => price,
            Err(e) => {
                warn!(error = %e, "price fetch failed");
                self.log.append(&format!("Error: {e}"));

                let auto_stopped = self.handle.record_failure();
                if auto_stopped {
                    warn!("too many consecutive fetch failures, monitor paused");
                    self.log.append("Too many consecutive errors, stopped");
                }
                return CycleReport::FetchFailed {
                    interval,
                    auto_stopped,
                };
            }
        };

        Span::current().record("price", price);
        self.handle.record_success();

        let sample = Sample::new(Utc::now(), price);
        self.history.push(sample);
        self.persist(sample);

        let stats = (cfg.stats_window_minutes > 0).then(|| {
            compute_stats(
                self.history.iter(),
                cfg.stats_window_minutes,
                sample.timestamp,
            )
        });
        let profit = derived_profit(price, cfg.buy_avg_price);

        self.log.append(&format!("Current price: {price:.2}"));
        self.display.update(price, profit, stats);

        let outcome = evaluate(price, &cfg);
        if outcome != AlertOutcome::None {
            // Latch first so the operator sees "paused" while the alert is up.
            self.handle.stop("price target reached");
            self.alerts.dispatch(outcome, price, &cfg).await;
        }

        CycleReport::Sampled {
            interval,
            price,
            profit,
            stats,
            outcome,
        }
    }

    /// Fire-and-forget write; a slow or broken store never stalls polling.
    fn persist(&self, sample: Sample) {
        let store = Arc::clone(&self.store);
        let log = Arc::clone(&self.log);

        tokio::spawn(
            async move {
                if let Err(e) = store.append(&sample).await {
                    error!(error = ?e, "failed to persist price sample");
                    log.append(&format!("Failed to save price history: {e}"));
                }
            }
            .instrument(child_span("persist_sample")),
        );
    }

    async fn sleep_unless_paused(&self, interval: Duration) {
        let mut remaining = interval;
        while !remaining.is_zero() && self.handle.is_running() {
            let step = remaining.min(SLEEP_STEP);
            sleep(step).await;
            remaining -= step;
        }
    }
}
