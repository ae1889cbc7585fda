//! Capabilities the loop pushes into: the operator log, the price/profit
//! display and the attention-grabbing local alert.

use std::collections::VecDeque;

use chrono::Local;
use parking_lot::Mutex;

use crate::stats::StatsResult;

pub const DEFAULT_MAX_LOG_LINES: usize = 1000;

pub trait LogSink: Send + Sync {
    fn append(&self, line: &str);
}

pub trait DisplaySink: Send + Sync {
    /// `stats` is `None` when no stats window is configured.
    fn update(&self, price: f64, profit: f64, stats: Option<StatsResult>);
}

/// Blocking local alert; returns once the operator has been alerted.
pub trait LocalAlert: Send + Sync {
    fn alert(&self, message: &str);
}

/// Operator log viewport: timestamped lines, bounded to the newest `max_lines`.
pub struct LogBuffer {
    lines: Mutex<VecDeque<String>>,
    max_lines: usize,
    echo: bool,
}

impl LogBuffer {
    /// With `echo`, every line is also written to stdout as it arrives.
    pub fn new(max_lines: usize, echo: bool) -> Self {
        let max_lines = max_lines.max(1);
        Self {
            lines: Mutex::new(VecDeque::with_capacity(max_lines.min(DEFAULT_MAX_LOG_LINES))),
            max_lines,
            echo,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }

    /// The newest `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let guard = self.lines.lock();
        guard.iter().skip(guard.len().saturating_sub(n)).cloned().collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOG_LINES, false)
    }
}

impl LogSink for LogBuffer {
    fn append(&self, line: &str) {
        let stamped = format!("{}: {}", Local::now().format("%Y-%m-%d %H:%M:%S"), line);
        if self.echo {
            println!("{stamped}");
        }

        let mut guard = self.lines.lock();
        guard.push_back(stamped);
        while guard.len() > self.max_lines {
            guard.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_timestamped() {
        let log = LogBuffer::default();
        log.append("started");
        let lines = log.lines();
        assert_eq!(lines.len(), 1);
        // "YYYY-MM-DD HH:MM:SS: started"
        assert_eq!(lines[0].len(), 19 + 2 + "started".len());
        assert!(lines[0].ends_with(": started"));
    }

    #[test]
    fn keeps_only_the_newest_lines() {
        let log = LogBuffer::new(3, false);
        for i in 0..5 {
            log.append(&format!("line {i}"));
        }
        let lines = log.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("line 2"));
        assert!(lines[2].ends_with("line 4"));

        let tail = log.tail(2);
        assert_eq!(tail.len(), 2);
        assert!(tail[0].ends_with("line 3"));
        assert_eq!(log.tail(10).len(), 3);
    }
}
