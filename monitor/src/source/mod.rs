pub mod client;
pub mod errors;
pub mod types;

use async_trait::async_trait;

pub use client::JijinhaoClient;
pub use errors::SourceError;

/// One read of the monitored price. Any error is a transient fetch failure.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self) -> Result<f64, SourceError>;
}

/// `NaN` and the infinities parse as `f64` but are never a quote.
pub fn ensure_finite(price: f64) -> Result<f64, SourceError> {
    if price.is_finite() {
        Ok(price)
    } else {
        Err(SourceError::NonFinitePrice(price))
    }
}
