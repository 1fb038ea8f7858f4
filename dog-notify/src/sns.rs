use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;
use tracing::debug;

use crate::{Notification, Notifier, NotifyError, NotifyResult, Protocol, Subscription, TopicArn};

/// Notifier backed by Amazon SNS
#[derive(Clone)]
pub struct SnsNotifier {
    client: Client,
}

impl SnsNotifier {
    /// Build a client from the AWS default chain, optionally pinning the region
    pub async fn connect(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self {
            client: Client::new(&sdk_config),
        }
    }

    /// Wrap a pre-configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn map_aws_error<E>(operation: &'static str, err: E) -> NotifyError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = DisplayErrorContext(&err).to_string();
        NotifyError::backend_with_message(operation, message, err)
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn list_topics(&self) -> NotifyResult<Vec<TopicArn>> {
        let mut topics = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .client
                .list_topics()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| Self::map_aws_error("ListTopics", err))?;

            topics.extend(
                output
                    .topics()
                    .iter()
                    .filter_map(|topic| topic.topic_arn())
                    .map(TopicArn::new),
            );

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        debug!(count = topics.len(), "listed topics");
        Ok(topics)
    }

    async fn create_topic(&self, name: &str) -> NotifyResult<TopicArn> {
        let output = self
            .client
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(|err| Self::map_aws_error("CreateTopic", err))?;

        output
            .topic_arn()
            .map(TopicArn::new)
            .ok_or_else(|| NotifyError::invalid(format!("CreateTopic returned no ARN for {}", name)))
    }

    async fn list_subscriptions(&self, topic: &TopicArn) -> NotifyResult<Vec<Subscription>> {
        let mut subscriptions = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .client
                .list_subscriptions_by_topic()
                .topic_arn(topic.as_str())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| Self::map_aws_error("ListSubscriptionsByTopic", err))?;

            subscriptions.extend(output.subscriptions().iter().map(|sub| Subscription {
                subscription_arn: sub.subscription_arn().unwrap_or_default().to_string(),
                protocol: sub.protocol().unwrap_or_default().to_string(),
                endpoint: sub.endpoint().unwrap_or_default().to_string(),
            }));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(subscriptions)
    }

    async fn subscribe(
        &self,
        topic: &TopicArn,
        protocol: Protocol,
        endpoint: &str,
    ) -> NotifyResult<Option<String>> {
        let output = self
            .client
            .subscribe()
            .topic_arn(topic.as_str())
            .protocol(protocol.as_str())
            .endpoint(endpoint)
            .send()
            .await
            .map_err(|err| Self::map_aws_error("Subscribe", err))?;

        Ok(output.subscription_arn().map(str::to_string))
    }

    async fn publish(&self, topic: &TopicArn, notification: &Notification) -> NotifyResult<Option<String>> {
        let output = self
            .client
            .publish()
            .topic_arn(topic.as_str())
            .subject(&notification.subject)
            .message(&notification.body)
            .send()
            .await
            .map_err(|err| Self::map_aws_error("Publish", err))?;

        Ok(output.message_id().map(str::to_string))
    }
}
