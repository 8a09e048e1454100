pub mod client;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const PAGE_NO: u32 = 1;
pub const ITEMS_PER_PAGE: u32 = 10;
pub const PAGE_PER_DISPLAY: u32 = 5;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("listing request returned HTTP {0}")]
    Status(u16),
    #[error("listing request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("listing response is not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Source of raw IPO listing pages.
#[async_trait]
pub trait ListingFeed: Send + Sync {
    /// Fetch the first listing page as an untyped JSON body.
    async fn fetch_listings(&self) -> Result<Value, FeedError>;
}

/// Build the listing URL with the fixed pagination parameters.
pub fn listing_url(base_url: &str) -> String {
    format!(
        "{}?&pageNo={}&itemsPerPage={}&pagePerDisplay={}",
        base_url, PAGE_NO, ITEMS_PER_PAGE, PAGE_PER_DISPLAY,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_appends_fixed_pagination() {
        assert_eq!(
            listing_url("https://example.test/api/ipo"),
            "https://example.test/api/ipo?&pageNo=1&itemsPerPage=10&pagePerDisplay=5"
        );
    }
}
