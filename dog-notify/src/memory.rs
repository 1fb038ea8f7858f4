use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    Notification, Notifier, NotifyError, NotifyResult, Protocol, Subscription, TopicArn,
    PENDING_CONFIRMATION,
};

const MEMORY_ARN_PREFIX: &str = "arn:aws:sns:us-east-1:000000000000:";

/// Notifier operations that can be made to fail on purpose in tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyOp {
    ListTopics,
    CreateTopic,
    ListSubscriptions,
    Subscribe,
    Publish,
}

impl NotifyOp {
    fn operation_name(self) -> &'static str {
        match self {
            NotifyOp::ListTopics => "ListTopics",
            NotifyOp::CreateTopic => "CreateTopic",
            NotifyOp::ListSubscriptions => "ListSubscriptionsByTopic",
            NotifyOp::Subscribe => "Subscribe",
            NotifyOp::Publish => "Publish",
        }
    }
}

/// A message captured by [`MemoryNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: TopicArn,
    pub notification: Notification,
}

/// In-memory notifier for testing and development.
///
/// New subscriptions start out pending, like email subscriptions on SNS,
/// until [`MemoryNotifier::confirm`] is called.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    topics: Arc<RwLock<Vec<TopicArn>>>,
    subscriptions: Arc<RwLock<HashMap<TopicArn, Vec<Subscription>>>>,
    published: Arc<RwLock<Vec<Published>>>,
    failures: Arc<RwLock<HashSet<NotifyOp>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a topic with an explicit address
    pub fn with_topic<S: Into<String>>(self, arn: S) -> Self {
        self.topics.write().push(TopicArn::new(arn));
        self
    }

    /// Address a topic with this name gets when created here
    pub fn arn_for(name: &str) -> TopicArn {
        TopicArn::new(format!("{}{}", MEMORY_ARN_PREFIX, name))
    }

    /// Mark a pending subscription as confirmed by the recipient
    pub fn confirm(&self, topic: &TopicArn, endpoint: &str) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let Some(subs) = subscriptions.get_mut(topic) else {
            return false;
        };
        match subs.iter_mut().find(|sub| sub.endpoint == endpoint && sub.is_pending()) {
            Some(sub) => {
                sub.subscription_arn = format!("{}:{}", topic, Uuid::new_v4());
                true
            }
            None => false,
        }
    }

    /// Everything published so far, in order
    pub fn published(&self) -> Vec<Published> {
        self.published.read().clone()
    }

    pub fn topics(&self) -> Vec<TopicArn> {
        self.topics.read().clone()
    }

    pub fn subscriptions(&self, topic: &TopicArn) -> Vec<Subscription> {
        self.subscriptions.read().get(topic).cloned().unwrap_or_default()
    }

    /// Make every call of `op` fail until cleared
    pub fn fail_on(&self, op: NotifyOp) {
        self.failures.write().insert(op);
    }

    pub fn clear_failures(&self) {
        self.failures.write().clear();
    }

    fn check_failure(&self, op: NotifyOp) -> NotifyResult<()> {
        if self.failures.read().contains(&op) {
            return Err(NotifyError::backend(
                op.operation_name(),
                std::io::Error::other("injected failure"),
            ));
        }
        Ok(())
    }

    fn ensure_topic(&self, topic: &TopicArn) -> NotifyResult<()> {
        if self.topics.read().contains(topic) {
            Ok(())
        } else {
            Err(NotifyError::topic_not_found(topic.as_str()))
        }
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn list_topics(&self) -> NotifyResult<Vec<TopicArn>> {
        self.check_failure(NotifyOp::ListTopics)?;
        Ok(self.topics.read().clone())
    }

    async fn create_topic(&self, name: &str) -> NotifyResult<TopicArn> {
        self.check_failure(NotifyOp::CreateTopic)?;
        if name.is_empty() {
            return Err(NotifyError::invalid("topic name must not be empty"));
        }
        let arn = Self::arn_for(name);
        let mut topics = self.topics.write();
        if !topics.contains(&arn) {
            topics.push(arn.clone());
        }
        Ok(arn)
    }

    async fn list_subscriptions(&self, topic: &TopicArn) -> NotifyResult<Vec<Subscription>> {
        self.check_failure(NotifyOp::ListSubscriptions)?;
        self.ensure_topic(topic)?;
        Ok(self.subscriptions(topic))
    }

    async fn subscribe(
        &self,
        topic: &TopicArn,
        protocol: Protocol,
        endpoint: &str,
    ) -> NotifyResult<Option<String>> {
        self.check_failure(NotifyOp::Subscribe)?;
        self.ensure_topic(topic)?;
        self.subscriptions
            .write()
            .entry(topic.clone())
            .or_default()
            .push(Subscription {
                subscription_arn: PENDING_CONFIRMATION.to_string(),
                protocol: protocol.as_str().to_string(),
                endpoint: endpoint.to_string(),
            });
        // SNS answers unconfirmed email subscriptions with this literal
        Ok(Some("pending confirmation".to_string()))
    }

    async fn publish(&self, topic: &TopicArn, notification: &Notification) -> NotifyResult<Option<String>> {
        self.check_failure(NotifyOp::Publish)?;
        self.ensure_topic(topic)?;
        self.published.write().push(Published {
            topic: topic.clone(),
            notification: notification.clone(),
        });
        Ok(Some(Uuid::new_v4().to_string()))
    }
}
