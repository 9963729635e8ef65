/// Search service client
///
/// `POST /index` upserts the document keyed by the asset id. Visibility in
/// search is eventually consistent and may lag arbitrarily.
use async_trait::async_trait;
use tracing::debug;
use video_core::VideoAsset;

use super::{read_body, NotifyOutcome, Notifier};
use crate::config::DownstreamConfig;
use crate::error::DownstreamError;
use crate::models::SearchIndexRequest;

const SERVICE: &str = "search";

#[derive(Clone, Debug)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(http: reqwest::Client, downstream: &DownstreamConfig) -> Self {
        Self {
            http,
            base_url: downstream.search_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Notifier for SearchClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn notify(&self, asset: &VideoAsset) -> Result<NotifyOutcome, DownstreamError> {
        let url = format!("{}/index", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&SearchIndexRequest::from(asset))
            .send()
            .await
            .map_err(|source| DownstreamError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        let body = read_body(SERVICE, response).await;
        if !status.is_success() {
            return Err(DownstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        debug!(asset_id = %asset.id, body = %body, "Indexed via search service");
        Ok(NotifyOutcome::Accepted)
    }
}
