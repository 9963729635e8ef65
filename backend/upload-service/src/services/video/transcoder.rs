/// FFmpeg-backed HLS transcoding
///
/// Turns a stored raw upload into a video-on-demand HLS rendition at the
/// deterministic `<upload_root>/<stem>_hls/index.m3u8` location. The
/// manifest appearing there is the only readiness signal; no status is
/// recorded anywhere else. Segments written by a failed run are left on disk.
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};
use video_core::constants::{AUDIO_BITRATE, HLS_SEGMENT_SECONDS, MANIFEST_FILE_NAME};
use video_core::naming;

use crate::config::TranscodeConfig;

/// Lines of ffmpeg stderr kept for the error log
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("input has no usable file name: {0}")]
    InvalidInput(PathBuf),

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("transcoder exited with {status}: {stderr_tail}")]
    Failed { status: String, stderr_tail: String },
}

/// Capability to produce an HLS manifest from a stored upload
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Blocks the calling task until the rendition is complete.
    /// Returns the manifest path on success.
    async fn produce_manifest(&self, raw_path: &Path) -> Result<PathBuf, TranscodeError>;
}

/// Fixed single-rendition HLS profile.
///
/// Baseline H.264 for broad device support, AAC audio, independent
/// keyframe-aligned segments, and a complete (VOD) playlist with no size cap.
#[derive(Clone, Debug)]
pub struct HlsProfile {
    pub video_codec: String,
    pub preset: String,
    pub video_profile: String,
    pub level: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub segment_seconds: u32,
}

impl Default for HlsProfile {
    fn default() -> Self {
        Self {
            video_codec: "h264".to_string(),
            preset: "veryfast".to_string(),
            video_profile: "baseline".to_string(),
            level: "3.1".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: AUDIO_BITRATE.to_string(),
            segment_seconds: HLS_SEGMENT_SECONDS,
        }
    }
}

impl HlsProfile {
    /// Build the ffmpeg argument list for one input/manifest pair
    pub fn ffmpeg_args(&self, input: &Path, manifest: &Path) -> Vec<String> {
        let mut args: Vec<String> = Vec::with_capacity(32);

        // Re-uploads replace the previous rendition
        args.push("-y".to_string());
        args.push("-i".to_string());
        args.push(input.to_string_lossy().into_owned());

        args.extend(
            [
                "-c:v",
                self.video_codec.as_str(),
                "-preset",
                self.preset.as_str(),
                "-profile:v",
                self.video_profile.as_str(),
                "-level",
                self.level.as_str(),
                "-c:a",
                self.audio_codec.as_str(),
                "-b:a",
                self.audio_bitrate.as_str(),
            ]
            .into_iter()
            .map(str::to_string),
        );

        args.push("-hls_time".to_string());
        args.push(self.segment_seconds.to_string());

        args.extend(
            [
                "-hls_playlist_type",
                "vod",
                "-hls_flags",
                "independent_segments",
                "-hls_segment_type",
                "mpegts",
                "-hls_list_size",
                "0",
            ]
            .into_iter()
            .map(str::to_string),
        );

        args.push(manifest.to_string_lossy().into_owned());
        args
    }
}

/// Runs the external `ffmpeg` binary
#[derive(Clone, Debug)]
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    upload_root: PathBuf,
    profile: HlsProfile,
}

impl FfmpegTranscoder {
    pub fn new(cfg: &TranscodeConfig, upload_root: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: cfg.ffmpeg_path.clone(),
            upload_root: upload_root.into(),
            profile: HlsProfile::default(),
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn produce_manifest(&self, raw_path: &Path) -> Result<PathBuf, TranscodeError> {
        let id = raw_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| TranscodeError::InvalidInput(raw_path.to_path_buf()))?;

        let out_dir = naming::manifest_dir(&self.upload_root, &id);
        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|source| TranscodeError::OutputDir {
                path: out_dir.clone(),
                source,
            })?;

        let manifest = out_dir.join(MANIFEST_FILE_NAME);
        let args = self.profile.ffmpeg_args(raw_path, &manifest);
        info!(asset_id = %id, output = %out_dir.display(), "Starting HLS transcode");
        debug!(asset_id = %id, ?args, "ffmpeg arguments");

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn {
                program: self.ffmpeg_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                status: output.status.to_string(),
                stderr_tail: stderr_tail(&output.stderr),
            });
        }

        info!(asset_id = %id, manifest = %manifest.display(), "HLS transcode finished");
        Ok(manifest)
    }
}

/// Readiness probe: a manifest on disk means the rendition is playable
pub async fn manifest_ready(manifest: &Path) -> bool {
    tokio::fs::try_exists(manifest).await.unwrap_or(false)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    // Progress updates are separated by carriage returns
    let lines: Vec<&str> = text
        .split(['\r', '\n'])
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
