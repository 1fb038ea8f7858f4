use tracing::info;

use crate::{Notifier, NotifyError, NotifyResult, Protocol, SubscriptionStatus, TopicArn};

/// Resolve a topic by exact name, creating it when no listed topic carries that name.
///
/// Matching is on the name segment of each address, so `Sales` does not pick
/// up `EmailSalesRepFromS3Bucket`.
pub async fn get_or_create_topic<N>(notifier: &N, name: &str) -> NotifyResult<TopicArn>
where
    N: Notifier + ?Sized,
{
    if name.trim().is_empty() {
        return Err(NotifyError::invalid("topic name must not be empty"));
    }

    let topics = notifier.list_topics().await?;
    if let Some(existing) = topics.into_iter().find(|topic| topic.name() == name) {
        info!(topic = %existing, "topic already exists");
        return Ok(existing);
    }

    let created = notifier.create_topic(name).await?;
    info!(topic = %created, "created topic");
    Ok(created)
}

/// Make sure `email` is subscribed to `topic` without creating duplicates
pub async fn subscribe_email<N>(notifier: &N, topic: &TopicArn, email: &str) -> NotifyResult<SubscriptionStatus>
where
    N: Notifier + ?Sized,
{
    if email.trim().is_empty() {
        return Err(NotifyError::invalid("email address must not be empty"));
    }

    let subscriptions = notifier.list_subscriptions(topic).await?;
    if let Some(existing) = subscriptions
        .iter()
        .find(|sub| sub.matches(Protocol::Email, email))
    {
        if existing.is_pending() {
            info!(email, "subscription is still pending confirmation");
            return Ok(SubscriptionStatus::PendingConfirmation);
        }
        info!(email, "email is already subscribed");
        return Ok(SubscriptionStatus::AlreadySubscribed);
    }

    let subscription_id = notifier.subscribe(topic, Protocol::Email, email).await?;
    info!(
        email,
        subscription = subscription_id.as_deref().unwrap_or("pending confirmation"),
        "subscription initiated"
    );
    Ok(SubscriptionStatus::Initiated)
}
