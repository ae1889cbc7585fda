use std::collections::VecDeque;

/// Number of consecutive failed polls that trips the breaker.
pub const FAILURE_WINDOW: usize = 5;

/// Outcome flags of the most recent polls, oldest first.
///
/// A consecutive-failure circuit breaker: it trips only when the whole
/// window is failures, so any success inside the last [`FAILURE_WINDOW`]
/// polls keeps it closed.
#[derive(Clone, Debug, Default)]
pub struct FailureTracker {
    window: VecDeque<bool>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(FAILURE_WINDOW + 1),
        }
    }

    pub fn record_failure(&mut self) {
        self.push(true);
    }

    pub fn record_success(&mut self) {
        self.push(false);
    }

    fn push(&mut self, failed: bool) {
        self.window.push_back(failed);
        while self.window.len() > FAILURE_WINDOW {
            self.window.pop_front();
        }
    }

    pub fn should_auto_stop(&self) -> bool {
        self.window.len() == FAILURE_WINDOW && self.window.iter().all(|&failed| failed)
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Flags as 1 (failed) / 0 (succeeded), oldest first.
    pub fn flags(&self) -> Vec<u8> {
        self.window.iter().map(|&f| f as u8).collect()
    }
}
