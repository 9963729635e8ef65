/// Fan-out notifiers for downstream collaborators
///
/// The catalog and search services are written independently with the
/// asset id as the shared idempotency key. There is no transaction between
/// them, no retry and no dead-letter queue; callers log and drop failures.
use async_trait::async_trait;
use std::time::Duration;
use video_core::VideoAsset;

use crate::config::DownstreamConfig;
use crate::error::DownstreamError;
use crate::models::CatalogVideo;

pub mod catalog;
pub mod search;

pub use catalog::CatalogClient;
pub use search::SearchClient;

/// How a downstream system received a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Accepted,
    /// The id was already known; treated as success
    AlreadyExists,
}

/// Pushes an asset's metadata to one downstream system
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn notify(&self, asset: &VideoAsset) -> Result<NotifyOutcome, DownstreamError>;
}

/// Read side of the catalog used by the listing proxy
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn list_videos(&self) -> Result<Vec<CatalogVideo>, DownstreamError>;
}

/// HTTP client shared by all downstream calls
pub fn build_http_client(cfg: &DownstreamConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(cfg.timeout())
        .connect_timeout(Duration::from_secs(5))
        .build()
}

async fn read_body(service: &'static str, response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(err) => {
            tracing::debug!(service, "failed to read response body: {}", err);
            String::new()
        }
    }
}
