/// Video file handling: raw storage and HLS transcoding
pub mod storage;
pub mod transcoder;

pub use storage::{LocalStorage, PendingWrite};
pub use transcoder::{manifest_ready, FfmpegTranscoder, HlsProfile, TranscodeError, Transcoder};
