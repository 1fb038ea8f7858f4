use std::fmt;
use std::sync::Arc;

use dog_blob::BlobStore;
use dog_notify::{Notification, Notifier, TopicArn};
use tracing::{info, Instrument, Span};

use crate::owner::{organized_key, owner_of};
use crate::{SyncError, SyncResult};

/// Original keys moved during one run, grouped by owner in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationRecord {
    owners: Vec<(String, Vec<String>)>,
}

impl RelocationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, owner: &str, key: &str) {
        match self.owners.iter_mut().find(|(existing, _)| existing == owner) {
            Some((_, keys)) => keys.push(key.to_string()),
            None => self.owners.push((owner.to_string(), vec![key.to_string()])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn file_count(&self) -> usize {
        self.owners.iter().map(|(_, keys)| keys.len()).sum()
    }

    pub fn keys_for(&self, owner: &str) -> Option<&[String]> {
        self.owners
            .iter()
            .find(|(existing, _)| existing == owner)
            .map(|(_, keys)| keys.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.owners.iter().map(|(owner, keys)| (owner.as_str(), keys.as_slice()))
    }
}

/// What a reorganize pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorganizeSummary {
    /// No key was relocated (duplicates may still have been removed)
    NothingToDo { duplicates_removed: usize },
    Relocated {
        files: usize,
        owners: usize,
        duplicates_removed: usize,
    },
}

impl ReorganizeSummary {
    pub fn is_nothing_to_do(&self) -> bool {
        matches!(self, ReorganizeSummary::NothingToDo { .. })
    }

    pub fn relocated_files(&self) -> usize {
        match self {
            ReorganizeSummary::NothingToDo { .. } => 0,
            ReorganizeSummary::Relocated { files, .. } => *files,
        }
    }

    pub fn duplicates_removed(&self) -> usize {
        match self {
            ReorganizeSummary::NothingToDo { duplicates_removed }
            | ReorganizeSummary::Relocated { duplicates_removed, .. } => *duplicates_removed,
        }
    }
}

impl fmt::Display for ReorganizeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReorganizeSummary::NothingToDo { duplicates_removed: 0 } => {
                f.write_str("No files were moved or deleted.")
            }
            ReorganizeSummary::NothingToDo { duplicates_removed } => {
                write!(f, "No files were moved; removed {} duplicate(s).", duplicates_removed)
            }
            ReorganizeSummary::Relocated {
                files,
                owners,
                duplicates_removed,
            } => write!(
                f,
                "Moved {} file(s) for {} owner(s) and sent notifications; removed {} duplicate(s).",
                files, owners, duplicates_removed
            ),
        }
    }
}

/// Notification sent to one owner after their files were moved
pub fn notification_for(owner: &str, keys: &[String]) -> Notification {
    Notification::new(
        format!("Files Moved Notification for {}", owner),
        format!("Files moved for {}: {}", owner, keys.join(", ")),
    )
}

/// Moves every key outside the destination prefix under `<prefix><owner>/`
/// and tells each owner which of their files moved.
///
/// Keys already under the prefix are left alone, which makes a second pass
/// over the same bucket a no-op. When the destination already holds the key,
/// the source is dropped as a duplicate and not reported. The first provider
/// error aborts the pass; moves done before it stay done.
pub struct Reorganizer {
    store: Arc<dyn BlobStore>,
    notifier: Arc<dyn Notifier>,
    span: Span,
}

impl Reorganizer {
    pub fn new(store: Arc<dyn BlobStore>, notifier: Arc<dyn Notifier>, span: Span) -> Self {
        Self { store, notifier, span }
    }

    pub async fn reorganize(
        &self,
        bucket: &str,
        destination_prefix: &str,
        topic: &TopicArn,
    ) -> SyncResult<ReorganizeSummary> {
        self.run(bucket, destination_prefix, topic)
            .instrument(self.span.clone())
            .await
    }

    async fn run(&self, bucket: &str, destination_prefix: &str, topic: &TopicArn) -> SyncResult<ReorganizeSummary> {
        if destination_prefix.is_empty() {
            return Err(SyncError::config("destination prefix must not be empty"));
        }

        info!(bucket, "listing objects");
        let keys = self.store.list_keys(bucket, None).await?;

        let mut relocations = RelocationRecord::new();
        let mut duplicates_removed = 0;

        for key in keys.iter().filter(|key| !key.starts_with(destination_prefix)) {
            let owner = owner_of(key);
            let destination = organized_key(destination_prefix, key);

            if self.store.exists(bucket, &destination).await? {
                self.store.delete(bucket, key).await?;
                duplicates_removed += 1;
                info!("Deleted original file '{}' as it already exists at '{}'.", key, destination);
            } else {
                self.store.copy(bucket, key, &destination).await?;
                self.store.delete(bucket, key).await?;
                relocations.record(owner, key);
                info!("Successfully moved {} to {}.", key, destination);
            }
        }

        for (owner, moved) in relocations.iter() {
            let notification = notification_for(owner, moved);
            self.notifier.publish(topic, &notification).await?;
            info!(owner, files = moved.len(), "notification sent: {}", notification.body);
        }

        let summary = if relocations.is_empty() {
            ReorganizeSummary::NothingToDo { duplicates_removed }
        } else {
            ReorganizeSummary::Relocated {
                files: relocations.file_count(),
                owners: relocations.owner_count(),
                duplicates_removed,
            }
        };
        info!("{}", summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_groups_by_owner_in_first_seen_order() {
        let mut record = RelocationRecord::new();
        record.record("sr2", "sr2_z.csv");
        record.record("sr1", "sr1_x.csv");
        record.record("sr2", "sr2_a.csv");

        let owners: Vec<&str> = record.iter().map(|(owner, _)| owner).collect();
        assert_eq!(owners, vec!["sr2", "sr1"]);
        assert_eq!(record.keys_for("sr2").unwrap(), ["sr2_z.csv", "sr2_a.csv"]);
        assert_eq!(record.file_count(), 3);
        assert_eq!(record.owner_count(), 2);
    }

    #[test]
    fn notification_names_owner_and_lists_keys() {
        let notification = notification_for("sr1", &["sr1_x.csv".to_string(), "sr1_y.csv".to_string()]);
        assert_eq!(notification.subject, "Files Moved Notification for sr1");
        assert_eq!(notification.body, "Files moved for sr1: sr1_x.csv, sr1_y.csv");
    }

    #[test]
    fn nothing_to_do_is_distinct_from_relocated() {
        let idle = ReorganizeSummary::NothingToDo { duplicates_removed: 0 };
        let busy = ReorganizeSummary::Relocated {
            files: 3,
            owners: 2,
            duplicates_removed: 1,
        };
        assert!(idle.is_nothing_to_do());
        assert!(!busy.is_nothing_to_do());
        assert_eq!(busy.relocated_files(), 3);
        assert_eq!(idle.to_string(), "No files were moved or deleted.");
    }
}
