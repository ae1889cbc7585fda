//! SQLite-backed [`HistoryStore`].
//!
//! Every statement runs under one private async mutex so a detached append
//! can never interleave with the start-up prune/load sweep.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use super::{HistoryStore, Sample};
use crate::time::{from_storage, to_storage};

pub struct SqliteHistoryStore {
    pool: SqlitePool,
    lock: Mutex<()>,
}

impl SqliteHistoryStore {
    /// Wraps a pool whose schema has already been migrated.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, sample: &Sample) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;

        sqlx::query("INSERT INTO price_samples (recorded_at, price) VALUES (?, ?)")
            .bind(to_storage(sample.timestamp))
            .bind(sample.price)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn query_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<Sample>> {
        let _guard = self.lock.lock().await;

        let rows = sqlx::query(
            r#"
SELECT recorded_at, price
FROM price_samples
WHERE recorded_at >= ?
ORDER BY recorded_at ASC, id ASC;
"#,
        )
        .bind(to_storage(since))
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let raw: String = r.get("recorded_at");
            match from_storage(&raw) {
                Ok(timestamp) => out.push(Sample::new(timestamp, r.get::<f64, _>("price"))),
                Err(e) => {
                    // poison-row resilience: skip but don't fail the load
                    tracing::warn!(error = %e, "skipping malformed price sample row");
                }
            }
        }

        Ok(out)
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let _guard = self.lock.lock().await;

        let done = sqlx::query("DELETE FROM price_samples WHERE recorded_at < ?")
            .bind(to_storage(cutoff))
            .execute(&self.pool)
            .await?;

        Ok(done.rows_affected())
    }
}
