//! Windowed statistics over the price history.

use chrono::{DateTime, TimeDelta, Utc};

use crate::history::Sample;

/// max/min/mean/median of the prices inside a trailing window.
///
/// All four fields are zero when the window held no samples; use
/// [`StatsResult::is_empty`] rather than reading that as a zero price.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatsResult {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
}

impl StatsResult {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Stats over samples with `timestamp >= now - window_minutes`.
///
/// Callers skip this entirely when the window is 0.
pub fn compute_stats<'a>(
    history: impl IntoIterator<Item = &'a Sample>,
    window_minutes: u64,
    now: DateTime<Utc>,
) -> StatsResult {
    let window = TimeDelta::try_minutes(window_minutes.min(i64::MAX as u64) as i64)
        .unwrap_or(TimeDelta::MAX);
    let since = now
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut prices: Vec<f64> = history
        .into_iter()
        .filter(|s| s.timestamp >= since)
        .map(|s| s.price)
        .collect();

    if prices.is_empty() {
        return StatsResult::default();
    }

    let mut max = f64::MIN;
    let mut min = f64::MAX;
    let mut sum = 0.0;
    for &p in &prices {
        max = max.max(p);
        min = min.min(p);
        sum += p;
    }
    let mean = sum / prices.len() as f64;

    prices.sort_by(f64::total_cmp);
    let mid = prices.len() / 2;
    let median = if prices.len() % 2 == 1 {
        prices[mid]
    } else {
        (prices[mid - 1] + prices[mid]) / 2.0
    };

    StatsResult {
        max,
        min,
        mean,
        median,
    }
}
