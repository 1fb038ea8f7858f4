use async_trait::async_trait;

use crate::{Notification, NotifyResult, Protocol, Subscription, TopicArn};

/// Publish/subscribe primitives - must be implemented by all notification backends.
///
/// Listing calls return the complete set; backends page internally.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Every topic visible to the caller
    async fn list_topics(&self) -> NotifyResult<Vec<TopicArn>>;

    /// Create a topic (providers return the existing address for a known name)
    async fn create_topic(&self, name: &str) -> NotifyResult<TopicArn>;

    /// Every subscription on one topic
    async fn list_subscriptions(&self, topic: &TopicArn) -> NotifyResult<Vec<Subscription>>;

    /// Request a new subscription, returning the provider's subscription id if it gave one
    async fn subscribe(
        &self,
        topic: &TopicArn,
        protocol: Protocol,
        endpoint: &str,
    ) -> NotifyResult<Option<String>>;

    /// Publish a message, returning the provider's message id if it gave one
    async fn publish(&self, topic: &TopicArn, notification: &Notification) -> NotifyResult<Option<String>>;
}
