/// Service layer for video ingestion
///
/// This module provides business logic for:
/// - Storage: durable raw file writes on the shared upload volume
/// - Transcoding: ffmpeg HLS renditions
/// - Fan-out: catalog and search notifications
/// - Background: detached task execution
///
/// `IngestPipeline` ties them together once a raw file has been stored.
use std::sync::Arc;

use tracing::{info, warn};
use video_core::{naming, VideoAsset};

pub mod background;
pub mod notify;
pub mod video;

pub use background::BackgroundTasks;
pub use notify::{Notifier, NotifyOutcome, VideoCatalog};
pub use video::{LocalStorage, Transcoder};

/// Post-save orchestration of an upload.
///
/// The catalog is notified inline (best-effort, outcome never affects the
/// client response); search indexing and transcoding are launched detached.
/// Only transcodes count against the concurrency limit.
#[derive(Clone)]
pub struct IngestPipeline {
    storage: LocalStorage,
    catalog: Arc<dyn Notifier>,
    search: Arc<dyn Notifier>,
    transcoder: Arc<dyn Transcoder>,
    tasks: BackgroundTasks,
    public_url: String,
}

impl IngestPipeline {
    pub fn new(
        storage: LocalStorage,
        catalog: Arc<dyn Notifier>,
        search: Arc<dyn Notifier>,
        transcoder: Arc<dyn Transcoder>,
        tasks: BackgroundTasks,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            catalog,
            search,
            transcoder,
            tasks,
            public_url: public_url.into(),
        }
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }

    /// Public playback link for a stored asset
    pub fn public_url_for(&self, id: &str) -> String {
        naming::public_url(&self.public_url, id)
    }

    /// Notify the catalog, launch search indexing and transcoding, and
    /// return the public playback URL. Never fails: everything past the
    /// save is best-effort.
    pub async fn publish(&self, asset: VideoAsset) -> String {
        let public_url = self.public_url_for(&asset.id);

        match self.catalog.notify(&asset).await {
            Ok(NotifyOutcome::Accepted) => {
                info!(asset_id = %asset.id, service = self.catalog.name(), "Catalog record initialized")
            }
            Ok(NotifyOutcome::AlreadyExists) => {
                info!(asset_id = %asset.id, service = self.catalog.name(), "Catalog record already present")
            }
            Err(err) => {
                warn!(asset_id = %asset.id, service = self.catalog.name(), error = %err, "Catalog notify failed")
            }
        }

        let asset = Arc::new(asset);

        let search = self.search.clone();
        let indexed = asset.clone();
        self.tasks.spawn("search_index", asset.id.clone(), async move {
            search.notify(&indexed).await.map(|_| ())
        });

        let transcoder = self.transcoder.clone();
        let transcoded = asset.clone();
        self.tasks.spawn_limited("transcode", asset.id.clone(), async move {
            transcoder
                .produce_manifest(&transcoded.raw_path)
                .await
                .map(|_| ())
        });

        public_url
    }
}
