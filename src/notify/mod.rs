pub mod discord;
pub mod embed;

use async_trait::async_trait;
use embed::WebhookPayload;

/// How a delivery attempt ended. None of these abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Rejected { status: u16, body: String },
    Unreachable { url: String, reason: String },
    Skipped,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, payload: &WebhookPayload) -> Delivery;

    /// Whether a completed run should advance the stored watermark.
    fn persists_state(&self) -> bool {
        true
    }
}

/// Prints the payload to stdout instead of posting it; used by `--dry-run`.
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn deliver(&self, payload: &WebhookPayload) -> Delivery {
        match serde_json::to_string_pretty(payload) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!(error = %e, "failed to encode payload for dry run"),
        }
        Delivery::Skipped
    }

    fn persists_state(&self) -> bool {
        false
    }
}
