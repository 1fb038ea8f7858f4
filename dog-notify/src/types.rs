use std::fmt;

/// SNS reports unconfirmed subscriptions with this in place of an ARN
pub const PENDING_CONFIRMATION: &str = "PendingConfirmation";

/// Provider-assigned topic address (an ARN on SNS)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicArn(String);

impl TopicArn {
    pub fn new<S: Into<String>>(arn: S) -> Self {
        Self(arn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Topic name: the segment after the last `:`
    pub fn name(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TopicArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery protocol of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Email,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Email => "email",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One subscription as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub subscription_arn: String,
    pub protocol: String,
    pub endpoint: String,
}

impl Subscription {
    /// Subscriptions awaiting the recipient's confirmation have no real ARN yet
    pub fn is_pending(&self) -> bool {
        self.subscription_arn.ends_with(PENDING_CONFIRMATION)
    }

    pub fn matches(&self, protocol: Protocol, endpoint: &str) -> bool {
        self.protocol == protocol.as_str() && self.endpoint == endpoint
    }
}

/// Where an email subscription stands after `subscribe_email`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Confirmed subscription already in place
    AlreadySubscribed,
    /// Requested earlier, recipient has not confirmed yet
    PendingConfirmation,
    /// New subscription request sent in this call
    Initiated,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::AlreadySubscribed => f.write_str("already subscribed"),
            SubscriptionStatus::PendingConfirmation => f.write_str("pending confirmation"),
            SubscriptionStatus::Initiated => f.write_str("subscription initiated"),
        }
    }
}

/// Message to publish on a topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new<S: Into<String>, B: Into<String>>(subject: S, body: B) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_name_is_last_arn_segment() {
        let arn = TopicArn::new("arn:aws:sns:us-east-1:123456789012:EmailSalesRepFromS3Bucket");
        assert_eq!(arn.name(), "EmailSalesRepFromS3Bucket");
        assert_eq!(TopicArn::new("bare").name(), "bare");
    }

    #[test]
    fn pending_subscriptions_are_detected() {
        let sub = Subscription {
            subscription_arn: PENDING_CONFIRMATION.to_string(),
            protocol: "email".to_string(),
            endpoint: "rep@example.com".to_string(),
        };
        assert!(sub.is_pending());
        assert!(sub.matches(Protocol::Email, "rep@example.com"));
        assert!(!sub.matches(Protocol::Email, "other@example.com"));
    }
}
