use std::fmt;
use std::path::{Path, PathBuf};

use dog_blob::BlobError;
use dog_notify::NotifyError;
use thiserror::Error;

/// Result type for pipeline stages
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors a pipeline stage can end with
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{} file(s) failed to upload: {}", .failures.len(), join_failures(.failures))]
    UploadIncomplete {
        uploaded: Vec<String>,
        failures: Vec<UploadFailure>,
    },
}

impl SyncError {
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }
}

/// One local file the uploader could not push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub file: String,
    pub message: String,
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to upload {}. Error: {}", self.file, self.message)
    }
}

fn join_failures(failures: &[UploadFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
