use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid sendkey format: {0}")]
    InvalidKey(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push service rejected message (code {code}): {message}")]
    Rejected { code: i64, message: String },
}

/// Best-effort push notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, key: &str, title: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct PushPayload<'a> {
    title: &'a str,
    desp: &'a str,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// ServerChan (Turbo and `sctp` v3 keys) webhook.
#[derive(Clone)]
pub struct ServerChanNotifier {
    http: Client,
}

impl ServerChanNotifier {
    pub fn new() -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Notifier for ServerChanNotifier {
    #[instrument(skip(self, key, body), fields(title = %title), level = "debug")]
    async fn notify(&self, key: &str, title: &str, body: &str) -> Result<(), NotifyError> {
        let url = send_url(key)?;

        let resp: PushResponse = self
            .http
            .post(&url)
            .json(&PushPayload { title, desp: body })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.code != 0 {
            return Err(NotifyError::Rejected {
                code: resp.code,
                message: resp.message,
            });
        }

        debug!("push notification delivered");
        Ok(())
    }
}

/// `sctp<uid>t...` keys go to the per-user v3 host, everything else to Turbo.
pub fn send_url(key: &str) -> Result<String, NotifyError> {
    let key = key.trim();
    if key.is_empty() || key.contains(['/', '?', '#']) {
        return Err(NotifyError::InvalidKey(key.to_string()));
    }

    if let Some(rest) = key.strip_prefix("sctp") {
        let uid: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if uid.is_empty() || !rest[uid.len()..].starts_with('t') {
            return Err(NotifyError::InvalidKey(key.to_string()));
        }
        return Ok(format!("https://{uid}.push.ft07.com/send/{key}.send"));
    }

    Ok(format!("https://sctapi.ftqq.com/{key}.send"))
}
