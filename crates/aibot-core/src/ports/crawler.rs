//! Crawler port.
//!
//! The bot can pull related content from external sites to enrich a
//! question. Only the seam lives here; scraping is an adapter concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// One item returned by a crawler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawledItem {
    pub title: String,
    pub url: String,
    pub summary: String,
}

#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("crawler source unavailable: {0}")]
    Unavailable(String),

    #[error("crawl cancelled")]
    Cancelled,
}

/// Fetches content related to a keyword.
#[async_trait]
pub trait CrawlerPort: Send + Sync {
    async fn fetch(
        &self,
        cancel: &CancellationToken,
        keyword: &str,
    ) -> Result<Vec<CrawledItem>, CrawlerError>;
}

/// Crawler that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCrawler;

#[async_trait]
impl CrawlerPort for NoopCrawler {
    async fn fetch(
        &self,
        cancel: &CancellationToken,
        _keyword: &str,
    ) -> Result<Vec<CrawledItem>, CrawlerError> {
        if cancel.is_cancelled() {
            return Err(CrawlerError::Cancelled);
        }
        Ok(Vec::new())
    }
}
