/// Data models for upload-service
///
/// This module defines structures for:
/// - Upload: the multipart form fields and the client-facing response
/// - Catalog: the init payload and listing entries of the social/catalog service
/// - Search: the ingestion document of the search service
///
use serde::{Deserialize, Serialize};
use video_core::{naming, AssetMetadata, VideoAsset};

// ========================================
// Upload Models
// ========================================

/// Text fields accepted next to the `video` part
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    pub uploader: String,
    pub duration: Option<String>,
}

impl UploadForm {
    /// Assign a text field by its multipart name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = value,
            "description" => self.description = value,
            "uploader" => self.uploader = value,
            "duration" => self.duration = Some(value),
            _ => {}
        }
    }

    pub fn into_metadata(self) -> AssetMetadata {
        AssetMetadata {
            duration: parse_duration(self.duration.as_deref()),
            title: self.title,
            description: self.description,
            author: self.uploader,
        }
    }
}

/// Seconds as a float; anything absent, unparseable or non-finite is zero
pub fn parse_duration(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub path: String,
}

// ========================================
// Catalog Models
// ========================================

/// Body of `POST {catalog}/init`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogInitRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub thumbnail: String,
    pub path: String,
    pub duration: f64,
}

impl CatalogInitRequest {
    pub fn from_asset(asset: &VideoAsset, public_url: &str, thumbnail_base: &str) -> Self {
        Self {
            id: asset.id.clone(),
            title: asset.metadata.title.clone(),
            description: asset.metadata.description.clone(),
            author: asset.metadata.author.clone(),
            thumbnail: naming::thumbnail_url(thumbnail_base, &asset.id),
            path: naming::public_url(public_url, &asset.id),
            duration: asset.metadata.duration,
        }
    }
}

/// Reply of `POST {catalog}/init`; only `status` is inspected
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogInitReply {
    #[serde(default)]
    pub status: String,
}

/// One document of `GET {catalog}/videos`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogVideo {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub views: i64,
}

/// Flattened listing entry returned by `GET /videos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub src: String,
    pub channel: String,
    pub views: String,
}

impl From<CatalogVideo> for VideoSummary {
    fn from(video: CatalogVideo) -> Self {
        Self {
            id: video.id,
            title: video.title,
            thumbnail: video.thumbnail,
            src: video.path,
            channel: video.author,
            views: video.views.to_string(),
        }
    }
}

// ========================================
// Search Models
// ========================================

/// Body of `POST {search}/index`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIndexRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
}

impl From<&VideoAsset> for SearchIndexRequest {
    fn from(asset: &VideoAsset) -> Self {
        Self {
            id: asset.id.clone(),
            title: asset.metadata.title.clone(),
            description: asset.metadata.description.clone(),
            author: asset.metadata.author.clone(),
        }
    }
}
