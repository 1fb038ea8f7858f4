use std::fmt;

use dog_blob::{BlobStore, BucketPlacement};
use tracing::info;

use crate::SyncResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    Existing,
    Created,
}

impl fmt::Display for BucketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketStatus::Existing => f.write_str("already exists"),
            BucketStatus::Created => f.write_str("created"),
        }
    }
}

/// Make sure `bucket` exists, creating it with `placement` if it does not
pub async fn ensure_bucket(
    store: &dyn BlobStore,
    bucket: &str,
    placement: &BucketPlacement,
) -> SyncResult<BucketStatus> {
    if store.bucket_exists(bucket).await? {
        info!("Bucket {} already exists.", bucket);
        return Ok(BucketStatus::Existing);
    }

    info!(
        region = placement.region().unwrap_or("default"),
        "Bucket {} does not exist. Creating bucket...", bucket
    );
    store.create_bucket(bucket, placement).await?;
    info!("Bucket {} created successfully.", bucket);
    Ok(BucketStatus::Created)
}
