/// Catalog (social) service client
///
/// `POST /init` creates the catalog record for a new upload. Re-submitting an
/// id the catalog already holds is a no-op success: either a 409 or a 2xx
/// whose `status` reads "already exists".
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};
use video_core::VideoAsset;

use super::{read_body, NotifyOutcome, Notifier, VideoCatalog};
use crate::config::{AppConfig, DownstreamConfig};
use crate::error::DownstreamError;
use crate::models::{CatalogInitReply, CatalogInitRequest, CatalogVideo};

const SERVICE: &str = "catalog";

#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    public_url: String,
    thumbnail_base_url: String,
}

impl CatalogClient {
    pub fn new(http: reqwest::Client, app: &AppConfig, downstream: &DownstreamConfig) -> Self {
        Self {
            http,
            base_url: downstream.catalog_url.trim_end_matches('/').to_string(),
            public_url: app.public_url.clone(),
            thumbnail_base_url: downstream.thumbnail_base_url.clone(),
        }
    }

    pub fn init_request(&self, asset: &VideoAsset) -> CatalogInitRequest {
        CatalogInitRequest::from_asset(asset, &self.public_url, &self.thumbnail_base_url)
    }
}

#[async_trait]
impl Notifier for CatalogClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn notify(&self, asset: &VideoAsset) -> Result<NotifyOutcome, DownstreamError> {
        let url = format!("{}/init", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&self.init_request(asset))
            .send()
            .await
            .map_err(|source| DownstreamError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            info!(asset_id = %asset.id, "Catalog record already exists");
            return Ok(NotifyOutcome::AlreadyExists);
        }

        let body = read_body(SERVICE, response).await;
        if !status.is_success() {
            return Err(DownstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let reply: CatalogInitReply = serde_json::from_str(&body).unwrap_or_default();
        if reply.status.contains("already exists") {
            info!(asset_id = %asset.id, "Catalog record already exists");
            Ok(NotifyOutcome::AlreadyExists)
        } else {
            debug!(asset_id = %asset.id, body = %body, "Catalog record created");
            Ok(NotifyOutcome::Accepted)
        }
    }
}

#[async_trait]
impl VideoCatalog for CatalogClient {
    async fn list_videos(&self) -> Result<Vec<CatalogVideo>, DownstreamError> {
        let url = format!("{}/videos", self.base_url);
        let response = self
            .http
            .get(&url)
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

        // The catalog encodes an empty collection as `null`
        let videos: Option<Vec<CatalogVideo>> =
            serde_json::from_str(&body).map_err(|e| DownstreamError::Decode {
                service: SERVICE,
                reason: e.to_string(),
            })?;
        Ok(videos.unwrap_or_default())
    }
}
