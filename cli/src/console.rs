use std::io::Write;

use parking_lot::Mutex;
use tracing::debug;

use monitor::sinks::{DisplaySink, LocalAlert};
use monitor::stats::StatsResult;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DisplaySnapshot {
    pub price: f64,
    pub profit: f64,
    pub stats: Option<StatsResult>,
}

/// Holds the latest values for the `status` and `stats` commands.
#[derive(Default)]
pub struct ConsoleDisplay {
    latest: Mutex<Option<DisplaySnapshot>>,
}

impl ConsoleDisplay {
    pub fn latest(&self) -> Option<DisplaySnapshot> {
        *self.latest.lock()
    }
}

impl DisplaySink for ConsoleDisplay {
    fn update(&self, price: f64, profit: f64, stats: Option<StatsResult>) {
        debug!(price, profit, ?stats, "display updated");
        *self.latest.lock() = Some(DisplaySnapshot {
            price,
            profit,
            stats,
        });
    }
}

/// Rings the terminal bell and prints a banner on stderr.
pub struct ConsoleAlert;

impl LocalAlert for ConsoleAlert {
    fn alert(&self, message: &str) {
        let rule = "=".repeat(48);
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "\x07{rule}");
        for line in message.lines() {
            let _ = writeln!(err, "  {line}");
        }
        let _ = writeln!(err, "{rule}\n(monitoring paused; `start` to resume)");
        let _ = err.flush();
    }
}

pub fn format_stats(stats: Option<StatsResult>) -> String {
    match stats {
        None => "stats disabled (window is 0)".to_string(),
        Some(s) if s.is_empty() => "no samples in window yet".to_string(),
        Some(s) => format!(
            "max {:.2}  min {:.2}  mean {:.2}  median {:.2}",
            s.max, s.min, s.mean, s.median
        ),
    }
}
