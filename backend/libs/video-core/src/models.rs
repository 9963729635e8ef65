//! Core video asset models

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::naming;

/// Lifecycle of an uploaded video.
///
/// Not persisted anywhere: `Ready` is only observable by probing for the
/// manifest on the upload volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    Uploaded,
    Transcoding,
    Ready,
    TranscodeFailed,
}

impl AssetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetState::Uploaded => "uploaded",
            AssetState::Transcoding => "transcoding",
            AssetState::Ready => "ready",
            AssetState::TranscodeFailed => "transcode_failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AssetState::Ready | AssetState::TranscodeFailed)
    }
}

/// Uploader-supplied descriptive metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub title: String,
    pub description: String,
    pub author: String,
    /// Seconds; zero when absent or unparseable
    pub duration: f64,
}

/// One uploaded video and the location of its stored original.
///
/// `id` is the stored file name and the idempotency key shared with the
/// catalog and search collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub id: String,
    pub metadata: AssetMetadata,
    pub raw_path: PathBuf,
}

impl VideoAsset {
    pub fn new(id: impl Into<String>, upload_root: &Path, metadata: AssetMetadata) -> Self {
        let id = id.into();
        let raw_path = naming::raw_path(upload_root, &id);
        Self {
            id,
            metadata,
            raw_path,
        }
    }

    /// Derived, never stored
    pub fn manifest_path(&self, upload_root: &Path) -> PathBuf {
        naming::manifest_path(upload_root, &self.id)
    }
}
