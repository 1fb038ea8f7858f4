use async_trait::async_trait;
use bytes::Bytes;

use crate::{BlobResult, BucketPlacement};

/// Core object storage operations - must be implemented by all storage backends.
///
/// Every call names its bucket. "Not found" is reported through the return
/// value (`false` / `None`) rather than as an error for existence checks and
/// reads, since callers branch on it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Whether the bucket exists and is reachable with the current credentials
    async fn bucket_exists(&self, bucket: &str) -> BlobResult<bool>;

    /// Create a bucket honouring the placement's location constraint
    async fn create_bucket(&self, bucket: &str, placement: &BucketPlacement) -> BlobResult<()>;

    /// List one page of keys, in key order
    async fn list_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation: Option<String>,
    ) -> BlobResult<ListPage>;

    /// Whether an object exists at `key`
    async fn exists(&self, bucket: &str, key: &str) -> BlobResult<bool>;

    /// Read an object's content, `None` if there is no such key
    async fn get(&self, bucket: &str, key: &str) -> BlobResult<Option<Bytes>>;

    /// Store an object, replacing any existing content
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> BlobResult<PutResult>;

    /// Server-side copy within one bucket
    async fn copy(&self, bucket: &str, from_key: &str, to_key: &str) -> BlobResult<()>;

    /// Delete an object (deleting a missing key is not an error)
    async fn delete(&self, bucket: &str, key: &str) -> BlobResult<()>;

    /// List every key in the bucket, following continuation tokens
    async fn list_keys(&self, bucket: &str, prefix: Option<&str>) -> BlobResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation = None;
        loop {
            let page = self.list_page(bucket, prefix, continuation.take()).await?;
            keys.extend(page.keys);
            match page.next_continuation {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }
        Ok(keys)
    }
}

/// One page of a bucket listing
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Token for the next page; `None` once the listing is exhausted
    pub next_continuation: Option<String>,
}

impl ListPage {
    pub fn last(keys: Vec<String>) -> Self {
        Self {
            keys,
            next_continuation: None,
        }
    }
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    pub etag: Option<String>,
    pub size_bytes: u64,
}
