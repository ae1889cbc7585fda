use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use super::{PriceSource, ensure_finite};
use super::errors::SourceError;
use super::types::QuoteEnvelope;

const PAYLOAD_MARKER: &str = "quot_str = [";

/// Price source backed by the jijinhao real-time quote script.
#[derive(Clone)]
pub struct JijinhaoClient {
    http: Client,
    url: String,
    product: String,
}

impl JijinhaoClient {
    pub fn new(url: String, product: String) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .default_headers(browser_headers())
            .build()?;

        Ok(Self { http, url, product })
    }
}

#[async_trait]
impl PriceSource for JijinhaoClient {
    #[instrument(skip(self), fields(product = %self.product), level = "debug")]
    async fn fetch_price(&self) -> Result<f64, SourceError> {
        let cache_buster = Utc::now().timestamp_millis().to_string();

        let body = self
            .http
            .get(&self.url)
            .query(&[
                ("categoryId", "225"),
                ("currentPage", "1"),
                ("pageSize", "8"),
                ("_", cache_buster.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let price = parse_quote(&body, &self.product)?;
        debug!(price, "quote fetched");

        Ok(price)
    }
}

/// Pulls the product's price out of the quote script body.
pub fn parse_quote(body: &str, product: &str) -> Result<f64, SourceError> {
    let payload = extract_payload(body).ok_or(SourceError::MissingPayload)?;
    let envelope: QuoteEnvelope = serde_json::from_str(payload)?;

    let item = envelope
        .data
        .iter()
        .find(|item| item.quote.q67 == product)
        .ok_or_else(|| SourceError::ProductNotFound(product.to_string()))?;

    let raw = item.quote.q63.trim();
    let price = raw
        .parse::<f64>()
        .map_err(|source| SourceError::InvalidPrice {
            value: raw.to_string(),
            source,
        })?;
    ensure_finite(price)
}

/// Text between `quot_str = [` and the last `]` on the same line.
fn extract_payload(body: &str) -> Option<&str> {
    let start = body.find(PAYLOAD_MARKER)? + PAYLOAD_MARKER.len();
    let rest = &body[start..];
    let line = rest.split(['\r', '\n']).next().unwrap_or(rest);
    let end = line.rfind(']')?;
    let payload = &line[..end];
    (!payload.is_empty()).then_some(payload)
}

fn browser_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    let pairs = [
        ("pragma", "no-cache"),
        ("cache-control", "no-cache"),
        (
            "user-agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/83.0.4103.97 Safari/537.36",
        ),
        ("accept", "*/*"),
        ("sec-fetch-site", "cross-site"),
        ("sec-fetch-mode", "no-cors"),
        ("sec-fetch-dest", "script"),
        ("referer", "https://www.cngold.org/paper/gonghang.html"),
        (
            "accept-language",
            "en-GB,en-US;q=0.9,en;q=0.8,zh-CN;q=0.7,zh;q=0.6",
        ),
    ];
    for (name, value) in pairs {
        h.insert(name, HeaderValue::from_static(value));
    }
    h
}
