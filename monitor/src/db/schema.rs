use sqlx::SqlitePool;

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    // Append-only price history. `recorded_at` is fixed-width UTC RFC 3339,
    // so textual comparison is chronological.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS price_samples (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  recorded_at TEXT NOT NULL,
  price REAL NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS idx_price_samples_recorded_at ON price_samples(recorded_at);"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
