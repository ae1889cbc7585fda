//! Price history
//! -------------
//! Durable storage of `(timestamp, price)` samples plus the in-memory mirror
//! the loop computes windowed statistics from.
//!
//! The store is written to off the polling path and read once at start-up;
//! after that the mirror is the only history the loop looks at.

pub mod mirror;
pub mod sqlite_store;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use mirror::HistoryMirror;
pub use sqlite_store::SqliteHistoryStore;

/// One observation of the monitored price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    pub fn now(price: f64) -> Self {
        Self::new(Utc::now(), price)
    }
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Durably records one sample.
    async fn append(&self, sample: &Sample) -> anyhow::Result<()>;

    /// Samples with `timestamp >= since`, oldest first.
    async fn query_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<Sample>>;

    /// Deletes samples with `timestamp < cutoff`; returns how many were removed.
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64>;

    /// Start-up sweep: drops everything older than `retention`, then returns
    /// what is left, oldest first.
    async fn load(&self, retention: Duration) -> anyhow::Result<Vec<Sample>> {
        let horizon = crate::time::cutoff(Utc::now(), retention);

        let pruned = self.prune_older_than(horizon).await?;
        if pruned > 0 {
            tracing::info!(pruned, horizon = %horizon, "pruned expired price samples");
        }

        self.query_since(horizon).await
    }
}
