use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://goldwatch.db";
pub const DEFAULT_QUOTE_URL: &str = "https://api.jijinhao.com/realtime/quotejs.htm";
pub const DEFAULT_PRODUCT: &str = "工行积存金";

/// Persisted samples older than this are pruned at start-up.
pub const RETENTION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Process-level settings resolved once at start-up.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// SQLite connection string for the sample history.
    pub database_url: String,

    /// Quote page polled by the jijinhao price source.
    pub quote_url: String,

    /// `q67` product name whose `q63` price is monitored.
    pub product: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            quote_url: std::env::var("GOLDWATCH_QUOTE_URL")
                .unwrap_or_else(|_| DEFAULT_QUOTE_URL.to_string()),
            product: std::env::var("GOLDWATCH_PRODUCT")
                .unwrap_or_else(|_| DEFAULT_PRODUCT.to_string()),
        }
    }
}

/// Monitoring parameters exactly as the operator entered them.
///
/// Fields stay textual so that a half-typed value is representable; the loop
/// validates a fresh snapshot at the top of every cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub buy_avg_price: String,
    pub target_buy_price: String,
    pub target_sell_price: String,
    pub interval_seconds: String,
    /// Empty means "no stats".
    pub stats_window_minutes: String,
    pub notify_enabled: bool,
    pub notify_key: String,
}

/// A validated snapshot of [`RawConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub buy_avg_price: f64,
    pub target_buy_price: f64,
    pub target_sell_price: f64,
    pub interval_seconds: u64,
    /// 0 disables windowed statistics.
    pub stats_window_minutes: u64,
    pub notify_enabled: bool,
    pub notify_key: String,
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Notifications go out only when switched on and a key is present.
    pub fn should_notify(&self) -> bool {
        self.notify_enabled && !self.notify_key.trim().is_empty()
    }
}

impl RawConfig {
    pub fn validate(&self) -> Result<Config, ConfigError> {
        let buy = required("buy average price", &self.buy_avg_price)?;
        let target_buy = required("target buy price", &self.target_buy_price)?;
        let target_sell = required("target sell price", &self.target_sell_price)?;
        let interval = required("interval", &self.interval_seconds)?;

        let buy_avg_price = parse_price("buy average price", buy)?;
        let target_buy_price = parse_price("target buy price", target_buy)?;
        let target_sell_price = parse_price("target sell price", target_sell)?;

        let interval_seconds = match interval.parse::<u64>() {
            Ok(v) if v > 0 => v,
            _ => return Err(ConfigError::InvalidInterval(interval.to_string())),
        };

        let window = self.stats_window_minutes.trim();
        let stats_window_minutes = if window.is_empty() {
            0
        } else {
            window
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidStatsWindow(window.to_string()))?
        };

        Ok(Config {
            buy_avg_price,
            target_buy_price,
            target_sell_price,
            interval_seconds,
            stats_window_minutes,
            notify_enabled: self.notify_enabled,
            notify_key: self.notify_key.trim().to_string(),
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ConfigError::MissingField(field));
    }
    Ok(v)
}

fn parse_price(field: &'static str, value: &str) -> Result<f64, ConfigError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ConfigError::InvalidPrice {
            field,
            value: value.to_string(),
        }),
    }
}

/// Where the loop reads its live configuration from.
pub trait ConfigSource: Send + Sync {
    fn current(&self) -> RawConfig;
}

/// Live-editable configuration shared between the command side and the loop.
#[derive(Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<RawConfig>>,
}

impl SharedConfig {
    pub fn new(initial: RawConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Applies an edit; visible to the loop from its next cycle.
    pub fn update(&self, edit: impl FnOnce(&mut RawConfig)) {
        let mut guard = self.inner.write();
        edit(&mut guard);
    }
}

impl ConfigSource for SharedConfig {
    fn current(&self) -> RawConfig {
        self.inner.read().clone()
    }
}
