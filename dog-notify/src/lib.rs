//! # dog-notify: Notification primitives for DogRS jobs
//!
//! `dog-notify` is the publish/subscribe counterpart of `dog-blob`. Jobs use it
//! to resolve a topic, keep an email recipient subscribed and publish grouped
//! messages once their storage work is done.
//!
//! ```rust
//! use dog_notify::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> NotifyResult<()> {
//! let notifier = MemoryNotifier::new();
//! let topic = get_or_create_topic(&notifier, "EmailSalesRepFromS3Bucket").await?;
//!
//! let status = subscribe_email(&notifier, &topic, "rep@example.com").await?;
//! assert_eq!(status, SubscriptionStatus::Initiated);
//!
//! notifier
//!     .publish(&topic, &Notification::new("Files Moved Notification for sr1", "Files moved for sr1: sr1_jan.csv"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod notifier;
mod sns;
mod topics;
mod types;

pub use error::{NotifyError, NotifyResult};
pub use memory::{MemoryNotifier, NotifyOp, Published};
pub use notifier::Notifier;
pub use sns::SnsNotifier;
pub use topics::{get_or_create_topic, subscribe_email};
pub use types::{
    Notification, Protocol, Subscription, SubscriptionStatus, TopicArn, PENDING_CONFIRMATION,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        get_or_create_topic, subscribe_email, MemoryNotifier, Notification, Notifier, NotifyError,
        NotifyResult, SnsNotifier, SubscriptionStatus, TopicArn,
    };
}
