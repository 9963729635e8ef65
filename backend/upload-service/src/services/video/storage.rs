/// Local storage for raw video uploads
///
/// Writes each upload under the shared upload root with its asset id as the
/// file name. Bytes land in a hidden temporary sibling first and are renamed
/// into place only once the body is complete, so a reader never observes a
/// partial raw file at the final path.
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Storage writer rooted at the shared upload directory
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload root if it does not exist yet
    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Open a pending write for `id`
    pub async fn begin(&self, id: &str) -> io::Result<PendingWrite> {
        let final_path = video_core::naming::raw_path(&self.root, id);
        // The temp name does not embed the id, so any id the file system
        // accepts as a final name also fits here
        let temp_path = self
            .root
            .join(format!(".{}.part", Uuid::new_v4().simple()));

        let file = File::create(&temp_path).await?;

        Ok(PendingWrite {
            file,
            temp_path,
            final_path,
            bytes_written: 0,
            committed: false,
        })
    }
}

/// An in-progress upload.
///
/// Dropping it without calling [`PendingWrite::commit`] removes the
/// temporary file.
#[derive(Debug)]
pub struct PendingWrite {
    file: File,
    temp_path: PathBuf,
    final_path: PathBuf,
    bytes_written: u64,
    committed: bool,
}

impl PendingWrite {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush to disk and move the file to its final, id-derived path
    pub async fn commit(mut self) -> io::Result<PathBuf> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        fs::rename(&self.temp_path, &self.final_path).await?;
        self.committed = true;
        Ok(self.final_path.clone())
    }
}

impl Drop for PendingWrite {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = std::fs::remove_file(&self.temp_path) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.temp_path.display(),
                    "failed to remove abandoned upload: {}",
                    err
                );
            }
        }
    }
}
