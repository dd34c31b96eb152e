//! Transient on-disk staging for uploaded files
//!
//! Every upload is written to its own uniquely named file inside the staging
//! directory before it is streamed to the upstream. A [`StagedUpload`] owns
//! that file and deletes it when dropped, so the file is gone once the upload
//! operation ends no matter how it ends: success, upstream error, timeout,
//! a validation failure after staging, or the request future being cancelled.

use mime::Mime;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Content type assumed when the client did not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Keep a client content type only if it parses as a media type
pub fn normalize_content_type(content_type: String) -> String {
    match content_type.parse::<Mime>() {
        Ok(_) => content_type,
        Err(e) => {
            debug!(%content_type, %e, "Unparseable content type, using default");
            DEFAULT_CONTENT_TYPE.to_string()
        }
    }
}

/// Directory in which uploads are staged
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the staging directory if it does not exist yet
    pub async fn prepare(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        debug!(dir = ?self.dir, "Staging directory ready");
        Ok(())
    }

    /// Create an empty staged file for one upload
    pub fn begin(
        &self,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> io::Result<StagedUpload> {
        let id = Uuid::new_v4();
        let prefix = format!("upload-{}-", id);
        let (file, path) = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(&self.dir)?
            .into_parts();

        observability::metrics::staged_upload_created();
        debug!(%id, path = ?&*path, "Staged upload created");

        Ok(StagedUpload {
            id,
            file: tokio::fs::File::from_std(file),
            path: Some(path),
            filename: filename.into(),
            content_type: normalize_content_type(content_type.into()),
            len: 0,
        })
    }

    /// Stage an in-memory blob in one go
    pub async fn stage_bytes(
        &self,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: &[u8],
    ) -> io::Result<StagedUpload> {
        let mut staged = self.begin(filename, content_type)?;
        staged.write(bytes).await?;
        staged.finish().await?;
        Ok(staged)
    }
}

/// A staged upload, deleted from disk when dropped
#[derive(Debug)]
pub struct StagedUpload {
    id: Uuid,
    file: tokio::fs::File,
    // Only taken in Drop.
    path: Option<TempPath>,
    filename: String,
    content_type: String,
    len: u64,
}

impl StagedUpload {
    /// Append a chunk to the staged file
    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    /// Flush everything written so far; call before handing the file to a reader
    pub async fn finish(&mut self) -> io::Result<()> {
        self.file.flush().await
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Original filename as sent by the client
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Number of bytes written
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let staged_path = path.to_path_buf();

        match path.close() {
            Ok(()) => debug!(id = %self.id, path = ?staged_path, "Staged upload deleted"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(id = %self.id, path = ?staged_path, "Staged upload already gone")
            }
            Err(e) => warn!(id = %self.id, path = ?staged_path, %e, "Failed to delete staged upload"),
        }
        observability::metrics::staged_upload_released();
    }
}
