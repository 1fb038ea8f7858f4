use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::{BlobError, BlobResult, BlobStore, BucketPlacement, ListPage, PutResult};

type Buckets = HashMap<String, BTreeMap<String, Bytes>>;

/// Store operations that can be made to fail on purpose in tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Exists,
    Get,
    Put,
    Copy,
    Delete,
}

impl StoreOp {
    fn operation_name(self) -> &'static str {
        match self {
            StoreOp::List => "ListObjectsV2",
            StoreOp::Exists => "HeadObject",
            StoreOp::Get => "GetObject",
            StoreOp::Put => "PutObject",
            StoreOp::Copy => "CopyObject",
            StoreOp::Delete => "DeleteObject",
        }
    }
}

/// In-memory store for testing and development.
///
/// Listing is ordered by key like S3 and paginated with `page_size`, using the
/// last returned key as the continuation token.
#[derive(Clone)]
pub struct MemoryBlobStore {
    buckets: Arc<RwLock<Buckets>>,
    placements: Arc<RwLock<HashMap<String, BucketPlacement>>>,
    failures: Arc<RwLock<HashSet<(StoreOp, Option<String>)>>>,
    page_size: usize,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            placements: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(HashSet::new())),
            page_size: 1000,
        }
    }

    /// Start with an empty bucket already in place
    pub fn with_bucket<S: Into<String>>(self, bucket: S) -> Self {
        self.buckets.write().entry(bucket.into()).or_default();
        self
    }

    /// Page size used by `list_page` (minimum 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Seed an object, creating the bucket if needed
    pub fn insert<B, K, V>(&self, bucket: B, key: K, body: V)
    where
        B: Into<String>,
        K: Into<String>,
        V: Into<Bytes>,
    {
        self.buckets
            .write()
            .entry(bucket.into())
            .or_default()
            .insert(key.into(), body.into());
    }

    /// All keys currently in a bucket, in key order
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .read()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Content of one object
    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.buckets.read().get(bucket).and_then(|objects| objects.get(key).cloned())
    }

    /// Placement a bucket was created with through `create_bucket`
    pub fn placement_of(&self, bucket: &str) -> Option<BucketPlacement> {
        self.placements.read().get(bucket).cloned()
    }

    /// Make `op` fail for one key (or every key when `key` is `None`) until cleared.
    ///
    /// `StoreOp::List` failures are keyed by bucket name rather than object key.
    pub fn fail_on(&self, op: StoreOp, key: Option<&str>) {
        self.failures.write().insert((op, key.map(str::to_string)));
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.failures.write().clear();
    }

    fn check_failure(&self, op: StoreOp, key: &str) -> BlobResult<()> {
        let failures = self.failures.read();
        if failures.contains(&(op, None)) || failures.contains(&(op, Some(key.to_string()))) {
            return Err(BlobError::backend(
                op.operation_name(),
                std::io::Error::other(format!("injected failure for {}", key)),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn bucket_exists(&self, bucket: &str) -> BlobResult<bool> {
        Ok(self.buckets.read().contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str, placement: &BucketPlacement) -> BlobResult<()> {
        let mut buckets = self.buckets.write();
        if buckets.contains_key(bucket) {
            return Err(BlobError::invalid(format!("bucket {} already exists", bucket)));
        }
        buckets.insert(bucket.to_string(), BTreeMap::new());
        self.placements.write().insert(bucket.to_string(), placement.clone());
        Ok(())
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation: Option<String>,
    ) -> BlobResult<ListPage> {
        self.check_failure(StoreOp::List, bucket)?;

        let buckets = self.buckets.read();
        let objects = buckets.get(bucket).ok_or_else(|| BlobError::bucket_not_found(bucket))?;

        let mut matching = objects
            .keys()
            .filter(|key| continuation.as_deref().map_or(true, |after| key.as_str() > after))
            .filter(|key| prefix.map_or(true, |p| key.starts_with(p)));

        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let next_continuation = if matching.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ListPage {
            keys,
            next_continuation,
        })
    }

    async fn exists(&self, bucket: &str, key: &str) -> BlobResult<bool> {
        self.check_failure(StoreOp::Exists, key)?;
        let buckets = self.buckets.read();
        let objects = buckets.get(bucket).ok_or_else(|| BlobError::bucket_not_found(bucket))?;
        Ok(objects.contains_key(key))
    }

    async fn get(&self, bucket: &str, key: &str) -> BlobResult<Option<Bytes>> {
        self.check_failure(StoreOp::Get, key)?;
        let buckets = self.buckets.read();
        let objects = buckets.get(bucket).ok_or_else(|| BlobError::bucket_not_found(bucket))?;
        Ok(objects.get(key).cloned())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        _content_type: Option<&str>,
    ) -> BlobResult<PutResult> {
        self.check_failure(StoreOp::Put, key)?;
        let mut buckets = self.buckets.write();
        let objects = buckets.get_mut(bucket).ok_or_else(|| BlobError::bucket_not_found(bucket))?;
        let size_bytes = body.len() as u64;
        objects.insert(key.to_string(), body);
        Ok(PutResult {
            etag: None,
            size_bytes,
        })
    }

    async fn copy(&self, bucket: &str, from_key: &str, to_key: &str) -> BlobResult<()> {
        self.check_failure(StoreOp::Copy, from_key)?;
        let mut buckets = self.buckets.write();
        let objects = buckets.get_mut(bucket).ok_or_else(|| BlobError::bucket_not_found(bucket))?;
        let body = objects
            .get(from_key)
            .cloned()
            .ok_or_else(|| BlobError::not_found(from_key))?;
        objects.insert(to_key.to_string(), body);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> BlobResult<()> {
        self.check_failure(StoreOp::Delete, key)?;
        let mut buckets = self.buckets.write();
        let objects = buckets.get_mut(bucket).ok_or_else(|| BlobError::bucket_not_found(bucket))?;
        objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_keys_follows_continuation_across_pages() {
        let store = MemoryBlobStore::new().with_bucket("b").with_page_size(2);
        for key in ["e", "a", "d", "c", "b"] {
            store.insert("b", key, "x");
        }

        let first = store.list_page("b", None, None).await.unwrap();
        assert_eq!(first.keys, vec!["a", "b"]);
        assert_eq!(first.next_continuation.as_deref(), Some("b"));

        let all = store.list_keys("b", None).await.unwrap();
        assert_eq!(all, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn last_full_page_has_no_continuation() {
        let store = MemoryBlobStore::new().with_bucket("b").with_page_size(2);
        store.insert("b", "a", "x");
        store.insert("b", "b", "x");

        let page = store.list_page("b", None, None).await.unwrap();
        assert_eq!(page.keys.len(), 2);
        assert!(page.next_continuation.is_none());
    }

    #[tokio::test]
    async fn list_failure_is_keyed_by_bucket() {
        let store = MemoryBlobStore::new().with_bucket("a").with_bucket("b");
        store.fail_on(StoreOp::List, Some("a"));

        let err = store.list_keys("a", None).await.unwrap_err();
        assert_eq!(err.operation(), Some("ListObjectsV2"));
        assert!(store.list_keys("b", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_respects_prefix() {
        let store = MemoryBlobStore::new().with_bucket("b");
        store.insert("b", "dct-sales/sr1/sr1_a.csv", "x");
        store.insert("b", "sr2_b.csv", "x");

        let keys = store.list_keys("b", Some("dct-sales/")).await.unwrap();
        assert_eq!(keys, vec!["dct-sales/sr1/sr1_a.csv"]);
    }

    #[tokio::test]
    async fn missing_key_is_not_an_error() {
        let store = MemoryBlobStore::new().with_bucket("b");
        assert!(!store.exists("b", "nope").await.unwrap());
        assert!(store.get("b", "nope").await.unwrap().is_none());
        store.delete("b", "nope").await.unwrap();
    }

    #[tokio::test]
    async fn missing_bucket_is_an_error() {
        let store = MemoryBlobStore::new();
        assert!(!store.bucket_exists("b").await.unwrap());
        let err = store.exists("b", "k").await.unwrap_err();
        assert!(matches!(err, BlobError::BucketNotFound { .. }));
    }

    #[tokio::test]
    async fn copy_keeps_source_and_requires_it() {
        let store = MemoryBlobStore::new().with_bucket("b");
        store.insert("b", "src", "payload");

        store.copy("b", "src", "dst").await.unwrap();
        assert_eq!(store.object("b", "dst").unwrap(), Bytes::from("payload"));
        assert!(store.object("b", "src").is_some());

        let err = store.copy("b", "missing", "dst2").await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound { .. }));
    }

    #[tokio::test]
    async fn create_bucket_records_placement() {
        let store = MemoryBlobStore::new();
        let placement = BucketPlacement::in_region("eu-central-1");
        store.create_bucket("b", &placement).await.unwrap();

        assert!(store.bucket_exists("b").await.unwrap());
        assert_eq!(store.placement_of("b"), Some(placement.clone()));
        assert!(store.create_bucket("b", &placement).await.is_err());
    }

    #[tokio::test]
    async fn injected_failures_surface_as_backend_errors() {
        let store = MemoryBlobStore::new().with_bucket("b");
        store.insert("b", "k", "x");
        store.fail_on(StoreOp::Delete, Some("k"));

        let err = store.delete("b", "k").await.unwrap_err();
        assert_eq!(err.operation(), Some("DeleteObject"));
        assert!(store.object("b", "k").is_some());

        store.clear_failures();
        store.delete("b", "k").await.unwrap();
        assert!(store.object("b", "k").is_none());
    }
}
