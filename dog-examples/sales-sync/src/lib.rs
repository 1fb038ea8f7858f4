//! # sales-sync
//!
//! Pushes local sales CSV exports into an object store bucket, files them
//! under one prefix per sales rep, emails each rep the list of files that
//! moved, and appends the run log to a log object in the same bucket.
//!
//! The storage and notification providers come in as `dog_blob::BlobStore`
//! and `dog_notify::Notifier` trait objects, so the whole pipeline runs
//! against the in-memory implementations in tests:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dog_blob::{BucketPlacement, MemoryBlobStore};
//! use dog_notify::MemoryNotifier;
//! use sales_sync::{Driver, SyncConfig};
//!
//! # async fn demo() -> sales_sync::SyncResult<()> {
//! let config = SyncConfig::new("reports@example.com");
//! let driver = Driver::new(
//!     config,
//!     Arc::new(MemoryBlobStore::new()),
//!     Arc::new(MemoryNotifier::new()),
//!     BucketPlacement::new(None),
//! );
//! let report = driver.run().await?;
//! assert!(report.succeeded());
//! # Ok(())
//! # }
//! ```

pub mod bucket;
pub mod config;
pub mod driver;
pub mod error;
pub mod log_shipper;
pub mod logging;
pub mod owner;
pub mod reorganizer;
pub mod scheduler;
pub mod uploader;

pub use bucket::{ensure_bucket, BucketStatus};
pub use config::SyncConfig;
pub use driver::{Driver, RunReport, Stage, StageReport};
pub use error::{SyncError, SyncResult, UploadFailure};
pub use log_shipper::{LogShipper, ShippedLog};
pub use logging::RunLogger;
pub use owner::{organized_key, owner_of, OWNER_DELIMITER};
pub use reorganizer::{notification_for, RelocationRecord, ReorganizeSummary, Reorganizer};
pub use scheduler::{run_every, Schedule};
pub use uploader::{UploadPlacement, UploadSummary, Uploader};
