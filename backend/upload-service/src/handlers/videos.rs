/// Video listing handler - proxies the catalog's collection
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::VideoSummary;
use crate::services::VideoCatalog;

/// List all videos known to the catalog, flattened for the web client.
///
/// A catalog failure surfaces as 500; this is the only endpoint whose
/// outcome depends on a downstream service.
pub async fn list_videos(catalog: web::Data<dyn VideoCatalog>) -> Result<HttpResponse> {
    let videos = catalog.list_videos().await.map_err(|err| {
        tracing::error!(error = %err, "Failed to fetch videos from catalog");
        err
    })?;

    let summaries: Vec<VideoSummary> = videos.into_iter().map(VideoSummary::from).collect();
    Ok(HttpResponse::Ok().json(summaries))
}
