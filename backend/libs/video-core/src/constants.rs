//! Ingestion pipeline constants

/// Default multipart body limit (1 GiB)
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024 * 1024;

/// Suffix appended to the raw file stem to name its HLS output directory
pub const HLS_DIR_SUFFIX: &str = "_hls";

/// Top-level playlist written inside every HLS output directory
pub const MANIFEST_FILE_NAME: &str = "index.m3u8";

/// Public route prefix under which the playback tier serves the upload volume
pub const PUBLIC_UPLOADS_PREFIX: &str = "uploads";

/// Target HLS segment duration in seconds
pub const HLS_SEGMENT_SECONDS: u32 = 6;

/// Audio bitrate used for every rendition
pub const AUDIO_BITRATE: &str = "128k";

/// Placeholder thumbnail dimensions (width, height)
pub const THUMBNAIL_DIMENSIONS: (u32, u32) = (640, 360);

/// Multipart field carrying the video bytes
pub const VIDEO_FIELD: &str = "video";

/// Upper bound for a single text field of the upload form (title, description, ...)
pub const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;
