use clap::Parser;

use monitor::config::RawConfig;
use monitor::sinks::DEFAULT_MAX_LOG_LINES;

#[derive(Debug, Parser)]
#[clap(name = "goldwatch", version, about = "Polls a gold price and alerts on buy/sell targets")]
pub struct Cli {
    /// How many log lines to keep for the `log` command
    #[clap(short = 'n', long, default_value_t = DEFAULT_MAX_LOG_LINES)]
    pub max_log_lines: usize,

    /// Send push notifications when a target is reached
    #[clap(long)]
    pub notify: bool,

    /// ServerChan sendkey used for push notifications
    #[clap(short = 'k', long, default_value = "")]
    pub key: String,

    /// Reference (average buy) price
    #[clap(long)]
    pub buy: Option<String>,

    /// Alert when the price falls to or below this
    #[clap(long)]
    pub target_buy: Option<String>,

    /// Alert when the price rises to or above this
    #[clap(long)]
    pub target_sell: Option<String>,

    /// Seconds between polls
    #[clap(long, default_value = "10")]
    pub interval: String,

    /// Trailing stats window in minutes (0 disables)
    #[clap(long, default_value = "60")]
    pub window: String,

    /// Start monitoring immediately instead of waiting for `start`
    #[clap(long)]
    pub autostart: bool,
}

impl Cli {
    /// The form as it looks before the operator types anything.
    pub fn initial_config(&self) -> RawConfig {
        RawConfig {
            buy_avg_price: self.buy.clone().unwrap_or_default(),
            target_buy_price: self.target_buy.clone().unwrap_or_default(),
            target_sell_price: self.target_sell.clone().unwrap_or_default(),
            interval_seconds: self.interval.clone(),
            stats_window_minutes: self.window.clone(),
            notify_enabled: self.notify,
            notify_key: self.key.clone(),
        }
    }
}
