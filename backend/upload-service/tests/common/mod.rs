//! Shared fixtures: in-memory collaborators and multipart body builder
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;
use upload_service::config::Config;
use upload_service::error::DownstreamError;
use upload_service::models::CatalogVideo;
use upload_service::services::video::{TranscodeError, Transcoder};
use upload_service::services::{
    BackgroundTasks, IngestPipeline, LocalStorage, Notifier, NotifyOutcome, VideoCatalog,
};
use video_core::{naming, VideoAsset};

pub const BOUNDARY: &str = "----upload-service-test-boundary";

/// Notifier that records every asset id it sees
pub struct RecordingNotifier {
    name: &'static str,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn ok(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn notify(&self, asset: &VideoAsset) -> Result<NotifyOutcome, DownstreamError> {
        self.calls.lock().unwrap().push(asset.id.clone());
        if self.fail {
            return Err(DownstreamError::Status {
                service: self.name,
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(NotifyOutcome::Accepted)
    }
}

/// Writes an empty manifest where ffmpeg would, or fails like a non-zero exit
pub struct FakeTranscoder {
    root: PathBuf,
    fail: bool,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeTranscoder {
    pub fn ok(root: &Path) -> Arc<Self> {
        Arc::new(Self {
            root: root.to_path_buf(),
            fail: false,
            gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(root: &Path) -> Arc<Self> {
        Arc::new(Self {
            root: root.to_path_buf(),
            fail: true,
            gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// The first transcode blocks until the returned sender fires (or drops)
    pub fn gated(root: &Path) -> (Arc<Self>, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        let transcoder = Arc::new(Self {
            root: root.to_path_buf(),
            fail: false,
            gate: Mutex::new(Some(gate)),
            calls: Mutex::new(Vec::new()),
        });
        (transcoder, release)
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn produce_manifest(&self, raw_path: &Path) -> Result<PathBuf, TranscodeError> {
        self.calls.lock().unwrap().push(raw_path.to_path_buf());
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let id = raw_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TranscodeError::InvalidInput(raw_path.to_path_buf()))?;

        let dir = naming::manifest_dir(&self.root, &id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| TranscodeError::OutputDir {
                path: dir.clone(),
                source,
            })?;

        if self.fail {
            return Err(TranscodeError::Failed {
                status: "exit status: 1".to_string(),
                stderr_tail: "Invalid data found when processing input".to_string(),
            });
        }

        let manifest = naming::manifest_path(&self.root, &id);
        tokio::fs::write(&manifest, b"#EXTM3U\n")
            .await
            .map_err(|source| TranscodeError::OutputDir {
                path: manifest.clone(),
                source,
            })?;
        Ok(manifest)
    }
}

/// Catalog read side with a canned answer
pub struct FakeCatalog {
    videos: Option<Vec<CatalogVideo>>,
}

impl FakeCatalog {
    pub fn with(videos: Vec<CatalogVideo>) -> Arc<Self> {
        Arc::new(Self {
            videos: Some(videos),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self { videos: None })
    }
}

#[async_trait]
impl VideoCatalog for FakeCatalog {
    async fn list_videos(&self) -> Result<Vec<CatalogVideo>, DownstreamError> {
        self.videos.clone().ok_or(DownstreamError::Status {
            service: "catalog",
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

pub fn test_config(upload_dir: &Path, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert(
        "UPLOAD_DIR".to_string(),
        upload_dir.to_string_lossy().into_owned(),
    );
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

pub struct Harness {
    pub catalog: Arc<RecordingNotifier>,
    pub search: Arc<RecordingNotifier>,
    pub transcoder: Arc<FakeTranscoder>,
    pub pipeline: IngestPipeline,
}

impl Harness {
    pub fn new(
        storage_root: &Path,
        catalog: Arc<RecordingNotifier>,
        search: Arc<RecordingNotifier>,
        transcoder: Arc<FakeTranscoder>,
    ) -> Self {
        Self::with_tasks(
            storage_root,
            catalog,
            search,
            transcoder,
            BackgroundTasks::current(),
        )
    }

    pub fn with_tasks(
        storage_root: &Path,
        catalog: Arc<RecordingNotifier>,
        search: Arc<RecordingNotifier>,
        transcoder: Arc<FakeTranscoder>,
        tasks: BackgroundTasks,
    ) -> Self {
        let pipeline = IngestPipeline::new(
            LocalStorage::new(storage_root),
            catalog.clone(),
            search.clone(),
            transcoder.clone(),
            tasks,
            "http://localhost:3001",
        );
        Self {
            catalog,
            search,
            transcoder,
            pipeline,
        }
    }

    pub fn healthy(root: &Path) -> Self {
        Self::new(
            root,
            RecordingNotifier::ok("catalog"),
            RecordingNotifier::ok("search"),
            FakeTranscoder::ok(root),
        )
    }
}

/// One multipart part: (field name, optional file name, bytes)
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Names in `dir`, sorted
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
