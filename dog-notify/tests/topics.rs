use dog_notify::{
    get_or_create_topic, subscribe_email, MemoryNotifier, NotifyError, NotifyOp, SubscriptionStatus,
};

#[tokio::test]
async fn creates_topic_when_missing() {
    let notifier = MemoryNotifier::new();

    let topic = get_or_create_topic(&notifier, "EmailSalesRepFromS3Bucket").await.unwrap();

    assert_eq!(topic.name(), "EmailSalesRepFromS3Bucket");
    assert_eq!(notifier.topics(), vec![topic]);
}

#[tokio::test]
async fn reuses_existing_topic_on_later_runs() {
    let notifier = MemoryNotifier::new();

    let first = get_or_create_topic(&notifier, "EmailSalesRepFromS3Bucket").await.unwrap();
    let second = get_or_create_topic(&notifier, "EmailSalesRepFromS3Bucket").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(notifier.topics().len(), 1);
}

#[tokio::test]
async fn name_lookup_is_exact_not_substring() {
    let notifier = MemoryNotifier::new()
        .with_topic("arn:aws:sns:eu-west-1:123456789012:EmailSalesRepFromS3Bucket");

    let topic = get_or_create_topic(&notifier, "Sales").await.unwrap();

    assert_eq!(topic.name(), "Sales");
    assert_eq!(notifier.topics().len(), 2);
}

#[tokio::test]
async fn finds_topic_created_elsewhere() {
    let arn = "arn:aws:sns:eu-west-1:123456789012:EmailSalesRepFromS3Bucket";
    let notifier = MemoryNotifier::new().with_topic(arn);

    let topic = get_or_create_topic(&notifier, "EmailSalesRepFromS3Bucket").await.unwrap();

    assert_eq!(topic.as_str(), arn);
}

#[tokio::test]
async fn listing_failure_is_reported() {
    let notifier = MemoryNotifier::new();
    notifier.fail_on(NotifyOp::ListTopics);

    let err = get_or_create_topic(&notifier, "t").await.unwrap_err();

    assert_eq!(err.operation(), Some("ListTopics"));
    assert!(notifier.topics().is_empty());
}

#[tokio::test]
async fn subscription_moves_from_initiated_to_pending_to_subscribed() {
    let notifier = MemoryNotifier::new();
    let topic = get_or_create_topic(&notifier, "t").await.unwrap();

    let status = subscribe_email(&notifier, &topic, "rep@example.com").await.unwrap();
    assert_eq!(status, SubscriptionStatus::Initiated);

    let status = subscribe_email(&notifier, &topic, "rep@example.com").await.unwrap();
    assert_eq!(status, SubscriptionStatus::PendingConfirmation);

    assert!(notifier.confirm(&topic, "rep@example.com"));
    let status = subscribe_email(&notifier, &topic, "rep@example.com").await.unwrap();
    assert_eq!(status, SubscriptionStatus::AlreadySubscribed);

    assert_eq!(notifier.subscriptions(&topic).len(), 1);
}

#[tokio::test]
async fn other_recipients_do_not_count_as_subscribed() {
    let notifier = MemoryNotifier::new();
    let topic = get_or_create_topic(&notifier, "t").await.unwrap();
    subscribe_email(&notifier, &topic, "someone@example.com").await.unwrap();

    let status = subscribe_email(&notifier, &topic, "rep@example.com").await.unwrap();

    assert_eq!(status, SubscriptionStatus::Initiated);
    assert_eq!(notifier.subscriptions(&topic).len(), 2);
}

#[tokio::test]
async fn subscribing_to_unknown_topic_fails() {
    let notifier = MemoryNotifier::new();
    let topic = MemoryNotifier::arn_for("missing");

    let err = subscribe_email(&notifier, &topic, "rep@example.com").await.unwrap_err();

    assert!(matches!(err, NotifyError::TopicNotFound { .. }));
}
