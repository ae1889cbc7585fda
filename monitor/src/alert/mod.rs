//! Threshold evaluation and alert fan-out.
//!
//! A triggered alert is a latch: the loop pauses after dispatching, so the
//! same condition does not fire again until the operator resumes.

pub mod notify;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, warn};

use crate::config::Config;
use crate::sinks::{LocalAlert, LogSink};

pub use notify::{Notifier, NotifyError, ServerChanNotifier};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertOutcome {
    None,
    BuyTriggered,
    SellTriggered,
}

/// Buy is checked first, so it wins when both targets are crossed at once.
pub fn evaluate(price: f64, cfg: &Config) -> AlertOutcome {
    if price <= cfg.target_buy_price {
        AlertOutcome::BuyTriggered
    } else if price >= cfg.target_sell_price {
        AlertOutcome::SellTriggered
    } else {
        AlertOutcome::None
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertMessage {
    pub title: String,
    pub body: String,
}

impl AlertMessage {
    /// `None` for [`AlertOutcome::None`].
    pub fn format(outcome: AlertOutcome, price: f64, cfg: &Config) -> Option<Self> {
        let (title, target_label, target, action) = match outcome {
            AlertOutcome::None => return None,
            AlertOutcome::BuyTriggered => (
                "Buy alert",
                "Target buy price",
                cfg.target_buy_price,
                "Consider buying!",
            ),
            AlertOutcome::SellTriggered => (
                "Sell alert",
                "Target sell price",
                cfg.target_sell_price,
                "Consider selling!",
            ),
        };

        Some(Self {
            title: title.to_string(),
            body: format!(
                "Reference price: {:.2}\nCurrent price: {:.2}\n{}: {:.2}\n{}",
                cfg.buy_avg_price, price, target_label, target, action
            ),
        })
    }
}

pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    local: Arc<dyn LocalAlert>,
    log: Arc<dyn LogSink>,
}

impl AlertDispatcher {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        local: Arc<dyn LocalAlert>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            notifier,
            local,
            log,
        }
    }

    /// Fans a triggered alert out to push + local alert.
    ///
    /// The push runs detached and its failure is only logged; the returned
    /// handle exists so callers may await delivery. The local alert always
    /// runs and is awaited before this returns.
    pub async fn dispatch(
        &self,
        outcome: AlertOutcome,
        price: f64,
        cfg: &Config,
    ) -> Option<JoinHandle<()>> {
        let msg = AlertMessage::format(outcome, price, cfg)?;

        info!(?outcome, price, "price target reached");
        self.log.append(&format!("{}\n{}", msg.title, msg.body));

        let push = cfg.should_notify().then(|| {
            let notifier = Arc::clone(&self.notifier);
            let log = Arc::clone(&self.log);
            let key = cfg.notify_key.clone();
            let (title, body) = (msg.title.clone(), msg.body.clone());

            tokio::spawn(
                async move {
                    if let Err(e) = notifier.notify(&key, &title, &body).await {
                        warn!(error = %e, "push notification failed");
                        log.append(&format!("Notification failed: [{e}]"));
                    }
                }
                .in_current_span(),
            )
        });

        let local = Arc::clone(&self.local);
        let text = format!("{}\n{}", msg.title, msg.body);
        if let Err(e) = tokio::task::spawn_blocking(move || local.alert(&text)).await {
            error!(error = %e, "local alert panicked");
        }

        push
    }
}
