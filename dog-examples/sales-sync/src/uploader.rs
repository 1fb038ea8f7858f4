use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use dog_blob::BlobStore;
use tracing::{error, info, warn, Instrument, Span};

use crate::owner::organized_key;
use crate::{SyncError, SyncResult, UploadFailure};

/// Where uploaded bytes are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPlacement {
    /// Bucket root under the file name; the reorganizer moves it and notifies the owner
    #[default]
    Landing,
    /// Straight to `<prefix><owner>/<file>`; no relocation and no notification follow
    Organized,
}

impl FromStr for UploadPlacement {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "landing" => Ok(UploadPlacement::Landing),
            "organized" => Ok(UploadPlacement::Organized),
            other => Err(SyncError::config(format!(
                "unknown upload placement {} (expected landing or organized)",
                other
            ))),
        }
    }
}

/// Outcome of one upload pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Keys written in this pass
    pub uploaded: Vec<String>,
    /// Local files already present in the store
    pub skipped: Vec<String>,
}

impl fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uploaded.is_empty() {
            f.write_str("No need to upload. Files already exist.")
        } else {
            write!(f, "Uploaded files: {}", self.uploaded.join(", "))
        }
    }
}

/// Pushes local files into the store, skipping the ones already there.
///
/// Every matching file is attempted. If any of them fails, the pass returns
/// [`SyncError::UploadIncomplete`] with both what made it and what didn't.
pub struct Uploader {
    store: Arc<dyn BlobStore>,
    extension: String,
    placement: UploadPlacement,
    span: Span,
}

impl Uploader {
    pub fn new(store: Arc<dyn BlobStore>, span: Span) -> Self {
        Self {
            store,
            extension: "csv".to_string(),
            placement: UploadPlacement::default(),
            span,
        }
    }

    /// Only upload files with this extension (without the dot)
    pub fn with_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_placement(mut self, placement: UploadPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub async fn upload(&self, bucket: &str, local_dir: &Path, destination_prefix: &str) -> SyncResult<UploadSummary> {
        self.upload_files(bucket, local_dir, destination_prefix)
            .instrument(self.span.clone())
            .await
    }

    async fn upload_files(&self, bucket: &str, local_dir: &Path, destination_prefix: &str) -> SyncResult<UploadSummary> {
        info!(dir = %local_dir.display(), bucket, "uploading files");
        let files = self.local_files(local_dir).await?;

        let mut summary = UploadSummary::default();
        let mut failures = Vec::new();

        for file_name in files {
            let organized = organized_key(destination_prefix, &file_name);
            let target = match self.placement {
                UploadPlacement::Landing => file_name.clone(),
                UploadPlacement::Organized => organized.clone(),
            };

            match self.already_stored(bucket, &organized, &target).await {
                Ok(true) => {
                    info!("{} already exists in S3, skipping upload.", file_name);
                    summary.skipped.push(file_name);
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    error!("Failed to check {}: {}", file_name, err);
                    failures.push(UploadFailure {
                        file: file_name,
                        message: err.to_string(),
                    });
                    continue;
                }
            }

            match self.put_file(bucket, &local_dir.join(&file_name), &target).await {
                Ok(()) => {
                    info!("Uploaded {} to S3 bucket {} with key {}.", file_name, bucket, target);
                    summary.uploaded.push(target);
                }
                Err(err) => {
                    let failure = UploadFailure {
                        file: file_name,
                        message: err.to_string(),
                    };
                    error!("{}", failure);
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            info!("{}", summary);
            Ok(summary)
        } else {
            Err(SyncError::UploadIncomplete {
                uploaded: summary.uploaded,
                failures,
            })
        }
    }

    /// Names of non-directory entries with the configured extension, sorted.
    /// Symlinks are kept; one that cannot be read fails at upload time.
    async fn local_files(&self, local_dir: &Path) -> SyncResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(local_dir)
            .await
            .map_err(|source| SyncError::io(local_dir, source))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| SyncError::io(local_dir, source))?
        {
            let path = entry.path();
            let is_dir = entry
                .file_type()
                .await
                .map_err(|source| SyncError::io(&path, source))?
                .is_dir();
            if is_dir || path.extension().and_then(|ext| ext.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => files.push(name),
                Err(name) => warn!(file = ?name, "skipping file with non UTF-8 name"),
            }
        }

        files.sort();
        Ok(files)
    }

    async fn already_stored(&self, bucket: &str, organized: &str, target: &str) -> SyncResult<bool> {
        if self.store.exists(bucket, organized).await? {
            return Ok(true);
        }
        if target != organized {
            return Ok(self.store.exists(bucket, target).await?);
        }
        Ok(false)
    }

    async fn put_file(&self, bucket: &str, path: &Path, key: &str) -> SyncResult<()> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| SyncError::io(path, source))?;
        self.store
            .put(bucket, key, Bytes::from(data), content_type_for(&self.extension))
            .await?;
        Ok(())
    }
}

fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension {
        "csv" => Some("text/csv"),
        "json" => Some("application/json"),
        "txt" | "log" => Some("text/plain"),
        _ => None,
    }
}
