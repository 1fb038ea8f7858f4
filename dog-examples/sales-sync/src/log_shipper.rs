use std::path::Path;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use dog_blob::BlobStore;
use tracing::{info, Instrument, Span};

use crate::{SyncError, SyncResult};

const LOG_CONTENT_TYPE: &str = "text/plain";

/// Result of appending the local run log to the remote one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippedLog {
    pub key: String,
    pub previous_bytes: usize,
    pub appended_bytes: usize,
}

impl ShippedLog {
    pub fn total_bytes(&self) -> usize {
        self.previous_bytes + self.appended_bytes
    }
}

/// Appends the local log file to a log object in the bucket.
///
/// Object stores have no append, so the remote object is read back, extended
/// and written whole. Two processes shipping to the same key at once can lose
/// each other's lines.
pub struct LogShipper {
    store: Arc<dyn BlobStore>,
    span: Span,
}

impl LogShipper {
    pub fn new(store: Arc<dyn BlobStore>, span: Span) -> Self {
        Self { store, span }
    }

    pub async fn ship(&self, bucket: &str, log_key: &str, local_log: &Path) -> SyncResult<ShippedLog> {
        self.append(bucket, log_key, local_log)
            .instrument(self.span.clone())
            .await
    }

    async fn append(&self, bucket: &str, log_key: &str, local_log: &Path) -> SyncResult<ShippedLog> {
        let existing = match self.store.get(bucket, log_key).await? {
            Some(body) => body,
            None => {
                info!("Log file {} does not exist yet. Creating it.", log_key);
                Bytes::new()
            }
        };

        // Read after the remote fetch so this stage's own lines make it in
        info!("Appending {} to s3://{}/{}", local_log.display(), bucket, log_key);
        let local = tokio::fs::read(local_log)
            .await
            .map_err(|source| SyncError::io(local_log, source))?;

        let mut combined = BytesMut::with_capacity(existing.len() + local.len());
        combined.extend_from_slice(&existing);
        combined.extend_from_slice(&local);

        self.store
            .put(bucket, log_key, combined.freeze(), Some(LOG_CONTENT_TYPE))
            .await?;

        Ok(ShippedLog {
            key: log_key.to_string(),
            previous_bytes: existing.len(),
            appended_bytes: local.len(),
        })
    }
}
