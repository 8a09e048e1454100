use super::{listing_url, FeedError, ListingFeed};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// HTTP client for the IPO listing endpoint.
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: listing_url(base_url),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ListingFeed for FeedClient {
    async fn fetch_listings(&self) -> Result<Value, FeedError> {
        tracing::debug!(url = %self.url, "fetching IPO listings");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(FeedError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        resp.json::<Value>().await.map_err(FeedError::Decode)
    }
}
