use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::config::ConfigSource;
use crate::error::ConfigError;
use crate::failure::FailureTracker;
use crate::sinks::LogSink;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Never started.
    Idle,
    Running,
    Paused,
}

/// Everything the worker and the command side both mutate.
#[derive(Debug)]
struct MonitorState {
    run: RunState,
    failures: FailureTracker,
}

/// Thread-safe control surface shared by the loop and whoever issues
/// start/pause commands.
///
/// The state lock is held only for the mutation itself, never across an
/// `.await` or a sink call.
#[derive(Clone)]
pub struct MonitorHandle {
    state: Arc<Mutex<MonitorState>>,
    wake: Arc<Notify>,
    config: Arc<dyn ConfigSource>,
    log: Arc<dyn LogSink>,
}

impl MonitorHandle {
    pub fn new(config: Arc<dyn ConfigSource>, log: Arc<dyn LogSink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MonitorState {
                run: RunState::Idle,
                failures: FailureTracker::new(),
            })),
            wake: Arc::new(Notify::new()),
            config,
            log,
        }
    }

    /// Idle/Paused -> Running, provided the current configuration validates.
    ///
    /// On invalid input the reason is logged and the state is left as is.
    pub fn start(&self) -> Result<(), ConfigError> {
        if let Err(e) = self.config.current().validate() {
            warn!(error = %e, "start rejected");
            self.log.append(&e.to_string());
            return Err(e);
        }

        let started = {
            let mut s = self.state.lock();
            let was = s.run;
            s.run = RunState::Running;
            was != RunState::Running
        };

        if started {
            self.wake.notify_one();
            info!("monitor started");
            self.log.append("Started");
        }
        Ok(())
    }

    /// Running -> Paused. Returns whether anything changed.
    pub fn pause(&self) -> bool {
        let paused = self.transition_to_paused();
        if paused {
            info!("monitor paused");
            self.log.append("Paused");
        }
        paused
    }

    /// The single run/pause button: pause when running, start otherwise.
    pub fn toggle(&self) -> Result<RunState, ConfigError> {
        if self.pause() {
            return Ok(RunState::Paused);
        }
        self.start().map(|_| RunState::Running)
    }

    pub fn run_state(&self) -> RunState {
        self.state.lock().run
    }

    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    /// Recent poll outcomes, 1 = failed, oldest first.
    pub fn failure_flags(&self) -> Vec<u8> {
        self.state.lock().failures.flags()
    }

    /// Records a failed fetch; trips to Paused and clears the window after
    /// five in a row. Returns whether it tripped.
    pub(crate) fn record_failure(&self) -> bool {
        let mut s = self.state.lock();
        s.failures.record_failure();
        if !s.failures.should_auto_stop() {
            return false;
        }
        s.failures.clear();
        if s.run == RunState::Running {
            s.run = RunState::Paused;
        }
        true
    }

    pub(crate) fn record_success(&self) {
        self.state.lock().failures.record_success();
    }

    /// Worker-initiated pause (alert latch, invalid live edit).
    pub(crate) fn stop(&self, reason: &'static str) {
        if self.transition_to_paused() {
            info!(reason, "monitor paused by loop");
            self.log.append(&format!("Paused ({reason})"));
        }
    }

    fn transition_to_paused(&self) -> bool {
        let mut s = self.state.lock();
        if s.run != RunState::Running {
            return false;
        }
        s.run = RunState::Paused;
        true
    }

    /// Parks until the next start command.
    pub(crate) async fn wait_for_start(&self) {
        self.wake.notified().await;
    }
}
