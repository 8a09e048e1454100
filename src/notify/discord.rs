use super::embed::WebhookPayload;
use super::{Delivery, Notifier};
use async_trait::async_trait;
use reqwest::Client;

pub struct DiscordWebhook {
    client: Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: &str) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn deliver(&self, payload: &WebhookPayload) -> Delivery {
        tracing::info!(embeds = payload.embeds.len(), "sending webhook to Discord");

        // `.json()` sets `Content-Type: application/json`.
        let resp = match self.client.post(&self.url).json(payload).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, "webhook request could not be sent");
                return Delivery::Unreachable {
                    url: self.url.clone(),
                    reason: e.to_string(),
                };
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "failed to send webhook");
            return Delivery::Rejected {
                status: status.as_u16(),
                body,
            };
        }

        Delivery::Delivered
    }
}
