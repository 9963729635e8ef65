//! Deterministic naming for everything derived from an asset id.
//!
//! The playback tier resolves the same names on the shared volume, so every
//! function here is pure and must stay stable across releases.

use std::path::{Path, PathBuf};

use crate::constants::{
    HLS_DIR_SUFFIX, MANIFEST_FILE_NAME, PUBLIC_UPLOADS_PREFIX, THUMBNAIL_DIMENSIONS,
};

/// Reduce a client-supplied file name to a bare, storable name.
///
/// Directory components from either separator style are dropped. Returns
/// `None` when nothing usable is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => None,
        name if name.chars().any(char::is_control) => None,
        name => Some(name.to_string()),
    }
}

/// File name without its final extension.
///
/// `clip.mp4` and `clip.mov` share the stem `clip` and therefore the same
/// HLS directory.
pub fn file_stem(id: &str) -> &str {
    match id.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => id,
    }
}

pub fn raw_path(upload_root: &Path, id: &str) -> PathBuf {
    upload_root.join(id)
}

pub fn hls_dir_name(id: &str) -> String {
    format!("{}{}", file_stem(id), HLS_DIR_SUFFIX)
}

pub fn manifest_dir(upload_root: &Path, id: &str) -> PathBuf {
    upload_root.join(hls_dir_name(id))
}

pub fn manifest_path(upload_root: &Path, id: &str) -> PathBuf {
    manifest_dir(upload_root, id).join(MANIFEST_FILE_NAME)
}

/// Canonical playback link for the stored original
pub fn public_url(public_base: &str, id: &str) -> String {
    format!(
        "{}/{}/{}",
        public_base.trim_end_matches('/'),
        PUBLIC_UPLOADS_PREFIX,
        urlencoding::encode(id)
    )
}

/// Placeholder thumbnail seeded by the asset id
pub fn thumbnail_url(thumbnail_base: &str, id: &str) -> String {
    let (width, height) = THUMBNAIL_DIMENSIONS;
    format!(
        "{}/{}/{}/{}",
        thumbnail_base.trim_end_matches('/'),
        urlencoding::encode(id),
        width,
        height
    )
}
