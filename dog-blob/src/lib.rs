//! # dog-blob: Object storage primitives for DogRS jobs
//!
//! `dog-blob` gives background jobs and services a small, bucket-scoped view of
//! an object store: existence checks, reads, writes, server-side copies,
//! deletes and fully paginated listings. It is the storage half of the
//! capability pair used by DogRS file pipelines (`dog-notify` is the other).
//!
//! ## Key Features
//!
//! - **Not-found is data**: `exists` returns `false` and `get` returns `None`
//!   instead of erroring, so idempotent pipelines can branch on it
//! - **Full listings**: `list_keys` follows continuation tokens until the
//!   bucket is exhausted
//! - **Region-aware bucket creation**: `BucketPlacement` drops the location
//!   constraint in `us-east-1`, where S3 rejects it
//! - **Storage agnostic**: AWS S3 and S3-compatible servers through
//!   `S3CompatibleStore`, plus `MemoryBlobStore` for tests
//!
//! ## Quick Start
//!
//! ```rust
//! use dog_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = MemoryBlobStore::new().with_bucket("sales");
//! store.put("sales", "sr1_jan.csv", bytes::Bytes::from("a,b\n"), Some("text/csv")).await?;
//!
//! if !store.exists("sales", "dct-sales/sr1/sr1_jan.csv").await? {
//!     store.copy("sales", "sr1_jan.csv", "dct-sales/sr1/sr1_jan.csv").await?;
//!     store.delete("sales", "sr1_jan.csv").await?;
//! }
//!
//! assert_eq!(store.list_keys("sales", None).await?, vec!["dct-sales/sr1/sr1_jan.csv"]);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod memory_store;
mod s3_store;
pub mod store;

pub use config::{BucketPlacement, S3Config, StaticCredentials, DEFAULT_REGION};
pub use error::{BlobError, BlobResult};
pub use memory_store::{MemoryBlobStore, StoreOp};
pub use s3_store::S3CompatibleStore;
pub use store::{BlobStore, ListPage, PutResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobError, BlobResult, BlobStore, BucketPlacement, MemoryBlobStore, S3CompatibleStore,
    };
}
