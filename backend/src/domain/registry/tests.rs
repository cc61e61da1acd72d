//! Behavioural coverage for the topic registry.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use chrono::{DateTime, Utc};
use rstest::{fixture, rstest};
use tokio::sync::Notify;

use super::*;
use crate::domain::ports::{FixturePubsubNetwork, MockPubsubNetwork};
use crate::domain::{ErrorCode, QueuePolicy, ServiceLimitsDraft};
use crate::test_support::MutableClock;

fn topic(name: &str) -> TopicName {
    TopicName::new(name).expect("valid topic")
}

fn peer(raw: &str) -> PeerId {
    PeerId::new(raw).expect("valid peer id")
}

fn message(from: &str, seqno: u64, data: &[u8]) -> PubsubMessage {
    PubsubMessage {
        from: peer(from),
        data: data.to_vec(),
        seqno: Some(seqno),
        signature: Some(vec![0xAA]),
        key: None,
    }
}

fn request(queue_length: u32, timeout: u32) -> SubscriptionRequest {
    SubscriptionRequest {
        queue_length: Some(queue_length),
        timeout: Some(timeout),
        ..SubscriptionRequest::default()
    }
}

#[fixture]
fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-04T05:06:07Z")
        .expect("RFC3339 fixture timestamp")
        .with_timezone(&Utc)
}

#[fixture]
fn clock(start: DateTime<Utc>) -> Arc<MutableClock> {
    Arc::new(MutableClock::new(start))
}

fn registry_with(
    network: impl PubsubNetwork + 'static,
    clock: Arc<MutableClock>,
    limits: ServiceLimits,
) -> TopicRegistry {
    TopicRegistry::new(Arc::new(network), clock, limits)
}

#[fixture]
fn registry(clock: Arc<MutableClock>) -> TopicRegistry {
    registry_with(FixturePubsubNetwork, clock, ServiceLimits::default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GatedCall {
    Subscribe,
    FailingSubscribe,
    Unsubscribe,
}

/// Network double tracking subscriptions. The first call matching `gate`
/// waits on `release` after signalling `parked`.
struct GatedNetwork {
    subscribed: Mutex<BTreeSet<TopicName>>,
    gate: GatedCall,
    armed: AtomicBool,
    parked: Notify,
    release: Notify,
}

impl GatedNetwork {
    fn new(gate: GatedCall) -> Arc<Self> {
        Arc::new(Self {
            subscribed: Mutex::new(BTreeSet::new()),
            gate,
            armed: AtomicBool::new(true),
            parked: Notify::new(),
            release: Notify::new(),
        })
    }

    async fn hold(&self, call: GatedCall) -> bool {
        if self.gate != call || !self.armed.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.parked.notify_one();
        self.release.notified().await;
        true
    }

    fn is_subscribed(&self, topic: &TopicName) -> bool {
        self.subscribed.lock().expect("network lock").contains(topic)
    }
}

#[async_trait]
impl PubsubNetwork for GatedNetwork {
    async fn subscribe(&self, topic: &TopicName) -> Result<(), NetworkError> {
        if self.hold(GatedCall::FailingSubscribe).await {
            return Err(NetworkError::unavailable("offline"));
        }
        self.hold(GatedCall::Subscribe).await;
        self.subscribed
            .lock()
            .expect("network lock")
            .insert(topic.clone());
        Ok(())
    }

    async fn unsubscribe(&self, topic: &TopicName) -> Result<(), NetworkError> {
        self.hold(GatedCall::Unsubscribe).await;
        self.subscribed.lock().expect("network lock").remove(topic);
        Ok(())
    }

    async fn publish(&self, topic: &TopicName, _data: Vec<u8>) -> Result<(), NetworkError> {
        if self.is_subscribed(topic) {
            Ok(())
        } else {
            Err(NetworkError::rejected(format!("topic {topic} is not subscribed")))
        }
    }
}

fn gated_registry(network: &Arc<GatedNetwork>, clock: Arc<MutableClock>) -> Arc<TopicRegistry> {
    Arc::new(TopicRegistry::new(
        network.clone(),
        clock,
        ServiceLimits::default(),
    ))
}

#[rstest]
#[tokio::test]
async fn join_subscribes_once_and_is_idempotent(clock: Arc<MutableClock>) {
    let mut network = MockPubsubNetwork::new();
    network
        .expect_subscribe()
        .times(1)
        .returning(|_| Ok(()));
    let registry = registry_with(network, clock, ServiceLimits::default());

    let first = registry
        .join(topic("chat"), SubscriptionRequest::default())
        .await
        .expect("first join");
    let second = registry
        .join(topic("chat"), SubscriptionRequest::default())
        .await
        .expect("second join");
    assert_eq!(first, second);
}

#[rstest]
#[tokio::test]
async fn failed_network_subscribe_rolls_back(clock: Arc<MutableClock>) {
    let mut network = MockPubsubNetwork::new();
    network
        .expect_subscribe()
        .returning(|_| Err(NetworkError::unavailable("offline")));
    let registry = registry_with(network, clock, ServiceLimits::default());

    let err = registry
        .join(topic("chat"), SubscriptionRequest::default())
        .await
        .expect_err("network is down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    let listed = registry
        .list(ListTopicsRequest::default())
        .await
        .expect("list");
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn join_enforces_topic_quota(clock: Arc<MutableClock>) {
    let limits = ServiceLimits::new(ServiceLimitsDraft {
        max_topics: 1,
        ..ServiceLimitsDraft::default()
    })
    .expect("valid limits");
    let registry = registry_with(FixturePubsubNetwork, clock, limits);

    registry
        .join(topic("a"), SubscriptionRequest::default())
        .await
        .expect("first topic fits");
    let err = registry
        .join(topic("b"), SubscriptionRequest::default())
        .await
        .expect_err("second topic exceeds quota");
    assert_eq!(err.code(), ErrorCode::QuotaExceeded);
    registry
        .join(topic("a"), SubscriptionRequest::default())
        .await
        .expect("re-joining an existing topic is not a new subscription");
}

#[rstest]
#[tokio::test]
async fn rejoin_with_smaller_queue_counts_evictions(registry: TopicRegistry) {
    let chat = topic("chat");
    registry
        .join(chat.clone(), request(5, 60))
        .await
        .expect("join");
    for seqno in 0..5 {
        registry.deliver(&chat, message("QmA", seqno, b"x"));
    }
    let config = registry
        .join(chat.clone(), request(2, 60))
        .await
        .expect("re-join");
    assert_eq!(config.queue_length(), 2);

    let batch = registry
        .read(&chat, ReadOptions::default())
        .await
        .expect("read");
    assert_eq!(batch.messages_dropped, 3);
    let seqnos: Vec<_> = batch.messages.iter().map(|m| m.seqno).collect();
    assert_eq!(seqnos, vec![None, None]);
    assert_eq!(batch.messages_remaining, 0);
}

#[rstest]
#[tokio::test]
async fn leave_unknown_topic_is_not_found(registry: TopicRegistry) {
    let err = registry.leave(&topic("ghost")).await.expect_err("not joined");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn leave_discards_messages_and_unsubscribes(clock: Arc<MutableClock>) {
    let mut network = MockPubsubNetwork::new();
    network.expect_subscribe().returning(|_| Ok(()));
    network
        .expect_unsubscribe()
        .withf(|topic| topic.as_str() == "chat")
        .times(1)
        .returning(|_| Ok(()));
    let registry = registry_with(network, clock, ServiceLimits::default());
    let chat = topic("chat");

    registry
        .join(chat.clone(), SubscriptionRequest::default())
        .await
        .expect("join");
    registry.deliver(&chat, message("QmA", 1, b"x"));
    registry.leave(&chat).await.expect("leave");

    let err = registry
        .read(&chat, ReadOptions::default())
        .await
        .expect_err("topic is gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn leave_tolerates_network_failure(clock: Arc<MutableClock>) {
    let mut network = MockPubsubNetwork::new();
    network.expect_subscribe().returning(|_| Ok(()));
    network
        .expect_unsubscribe()
        .returning(|_| Err(NetworkError::rejected("unknown topic")));
    let registry = registry_with(network, clock, ServiceLimits::default());

    registry
        .join(topic("chat"), SubscriptionRequest::default())
        .await
        .expect("join");
    registry.leave(&topic("chat")).await.expect("leave succeeds");
}

#[rstest]
#[tokio::test]
async fn publish_checks_subscription_and_size(clock: Arc<MutableClock>) {
    let mut network = MockPubsubNetwork::new();
    network.expect_subscribe().returning(|_| Ok(()));
    network
        .expect_publish()
        .withf(|topic, data| topic.as_str() == "chat" && data == b"hey")
        .times(1)
        .returning(|_, _| Ok(()));
    let registry = registry_with(network, clock, ServiceLimits::default());
    let chat = topic("chat");

    let missing = registry
        .publish(&chat, b"hey".to_vec())
        .await
        .expect_err("not joined");
    assert_eq!(missing.code(), ErrorCode::NotFound);

    registry
        .join(
            chat.clone(),
            SubscriptionRequest {
                max_message_size: Some(3),
                ..SubscriptionRequest::default()
            },
        )
        .await
        .expect("join");
    let too_big = registry
        .publish(&chat, b"hello".to_vec())
        .await
        .expect_err("payload too large");
    assert_eq!(too_big.code(), ErrorCode::PayloadTooLarge);

    registry
        .publish(&chat, b"hey".to_vec())
        .await
        .expect("publish");
}

#[rstest]
#[tokio::test]
async fn publish_maps_network_failure(clock: Arc<MutableClock>) {
    let mut network = MockPubsubNetwork::new();
    network.expect_subscribe().returning(|_| Ok(()));
    network
        .expect_publish()
        .returning(|_, _| Err(NetworkError::unavailable("no peers")));
    let registry = registry_with(network, clock, ServiceLimits::default());

    registry
        .join(topic("chat"), SubscriptionRequest::default())
        .await
        .expect("join");
    let err = registry
        .publish(&topic("chat"), b"hey".to_vec())
        .await
        .expect_err("network failure");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn read_strips_signatures_unless_requested(registry: TopicRegistry) {
    let chat = topic("chat");
    registry
        .join(chat.clone(), SubscriptionRequest::default())
        .await
        .expect("join");
    registry.deliver(&chat, message("QmA", 1, b"one"));
    registry.deliver(&chat, message("QmA", 2, b"two"));

    let stripped = registry
        .read(
            &chat,
            ReadOptions {
                max_messages: Some(1),
                include_signature: false,
            },
        )
        .await
        .expect("read");
    assert_eq!(stripped.messages_remaining, 1);
    assert_eq!(stripped.messages[0].data, b"one");
    assert_eq!(stripped.messages[0].signature, None);

    let signed = registry
        .read(
            &chat,
            ReadOptions {
                max_messages: None,
                include_signature: true,
            },
        )
        .await
        .expect("read");
    assert_eq!(signed.messages[0].signature, Some(vec![0xAA]));
    assert_eq!(signed.messages[0].seqno, Some(2));
}

#[rstest]
#[tokio::test]
async fn read_all_spends_a_shared_budget_in_name_order(registry: TopicRegistry) {
    for name in ["b/x", "a/x", "c/y"] {
        let t = topic(name);
        registry
            .join(t.clone(), SubscriptionRequest::default())
            .await
            .expect("join");
        registry.deliver(&t, message("QmA", 1, name.as_bytes()));
        registry.deliver(&t, message("QmA", 2, name.as_bytes()));
    }

    let batches = registry
        .read_all(
            TopicFilter::new(None, Some("/x".to_owned())),
            ReadOptions {
                max_messages: Some(3),
                include_signature: false,
            },
        )
        .await
        .expect("read all");

    let counts: Vec<_> = batches
        .iter()
        .map(|b| (b.topic.as_str().to_owned(), b.batch.messages.len()))
        .collect();
    assert_eq!(counts, vec![("a/x".to_owned(), 2), ("b/x".to_owned(), 1)]);
    assert_eq!(batches[1].batch.messages_remaining, 1);
}

#[rstest]
#[tokio::test]
async fn list_filters_paginates_and_sorts(registry: TopicRegistry) {
    for name in ["news/eu", "chat", "news/us", "news/asia"] {
        registry
            .join(topic(name), SubscriptionRequest::default())
            .await
            .expect("join");
    }

    let listed = registry
        .list(ListTopicsRequest {
            filter: TopicFilter::new(Some("news/".to_owned()), None),
            after: Some("news/asia".to_owned()),
            max_topics: Some(1),
        })
        .await
        .expect("list");
    let names: Vec<_> = listed.iter().map(|s| s.topic.as_str()).collect();
    assert_eq!(names, vec!["news/eu"]);
}

#[rstest]
#[tokio::test]
async fn expired_topics_disappear_and_are_swept(clock: Arc<MutableClock>) {
    let mut network = MockPubsubNetwork::new();
    network.expect_subscribe().returning(|_| Ok(()));
    network
        .expect_unsubscribe()
        .withf(|topic| topic.as_str() == "idle")
        .times(1)
        .returning(|_| Ok(()));
    let registry = registry_with(network, clock.clone(), ServiceLimits::default());

    registry.join(topic("idle"), request(5, 10)).await.expect("join");
    registry.join(topic("busy"), request(5, 10)).await.expect("join");

    clock.advance_seconds(8);
    registry
        .read(&topic("busy"), ReadOptions::default())
        .await
        .expect("read refreshes liveness");
    clock.advance_seconds(3);

    let listed = registry
        .list(ListTopicsRequest::default())
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(
        registry.deliver(&topic("idle"), message("QmA", 1, b"x")),
        DeliveryOutcome::UnknownTopic
    );

    let swept = registry.sweep_expired().await.expect("sweep");
    assert_eq!(swept, vec![topic("idle")]);
}

#[rstest]
#[tokio::test]
async fn expired_subscription_is_replaced_on_join(clock: Arc<MutableClock>) {
    let registry = registry_with(FixturePubsubNetwork, clock.clone(), ServiceLimits::default());
    let chat = topic("chat");
    registry.join(chat.clone(), request(5, 10)).await.expect("join");
    registry.deliver(&chat, message("QmA", 1, b"stale"));

    clock.advance_seconds(11);
    registry.join(chat.clone(), request(5, 10)).await.expect("re-join");

    let batch = registry
        .read(&chat, ReadOptions::default())
        .await
        .expect("read");
    assert!(batch.messages.is_empty());
}

#[rstest]
#[tokio::test]
async fn filter_peer_requires_subscription(registry: TopicRegistry) {
    let err = registry
        .filter_peer(&topic("chat"), peer("QmA"))
        .await
        .expect_err("not joined");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn filter_peer_purges_and_blocks(registry: TopicRegistry) {
    let chat = topic("chat");
    registry
        .join(chat.clone(), SubscriptionRequest::default())
        .await
        .expect("join");
    registry.deliver(&chat, message("QmBad", 1, b"spam"));
    registry.deliver(&chat, message("QmGood", 1, b"ham"));

    registry
        .filter_peer(&chat, peer("QmBad"))
        .await
        .expect("filter");
    assert_eq!(
        registry.deliver(&chat, message("QmBad", 2, b"spam")),
        DeliveryOutcome::FilteredPeer
    );

    let batch = registry
        .read(&chat, ReadOptions::default())
        .await
        .expect("read");
    assert_eq!(batch.messages.len(), 1);
    assert_eq!(batch.messages[0].from, peer("QmGood"));
}

#[rstest]
#[tokio::test]
async fn drop_new_policy_keeps_the_oldest(registry: TopicRegistry) {
    let chat = topic("chat");
    registry
        .join(
            chat.clone(),
            SubscriptionRequest {
                queue_length: Some(1),
                queue_policy: Some(QueuePolicy::DropNew),
                ..SubscriptionRequest::default()
            },
        )
        .await
        .expect("join");

    assert_eq!(
        registry.deliver(&chat, message("QmA", 1, b"first")),
        DeliveryOutcome::Queued
    );
    assert_eq!(
        registry.deliver(&chat, message("QmA", 2, b"second")),
        DeliveryOutcome::DroppedNew
    );

    let batch = registry
        .read(&chat, ReadOptions::default())
        .await
        .expect("read");
    assert_eq!(batch.messages_dropped, 1);
    assert_eq!(batch.messages[0].data, b"first");
}

#[rstest]
#[tokio::test]
async fn discovery_reports_limits(registry: TopicRegistry) {
    let limits = registry.discovery().await.expect("discovery");
    assert_eq!(limits, ServiceLimits::default());
}

#[rstest]
#[tokio::test]
async fn rejoin_during_sweep_keeps_the_network_subscription(clock: Arc<MutableClock>) {
    let network = GatedNetwork::new(GatedCall::Unsubscribe);
    let registry = gated_registry(&network, clock.clone());
    let chat = topic("chat");
    registry.join(chat.clone(), request(5, 1)).await.expect("join");
    clock.advance_seconds(5);

    let sweeper = tokio::spawn({
        let registry = registry.clone();
        async move { registry.sweep_expired().await }
    });
    network.parked.notified().await;
    let rejoin = tokio::spawn({
        let registry = registry.clone();
        let chat = chat.clone();
        async move { registry.join(chat, request(5, 60)).await }
    });
    tokio::task::yield_now().await;
    network.release.notify_one();

    let swept = sweeper.await.expect("sweeper task").expect("sweep");
    assert_eq!(swept, vec![chat.clone()]);
    rejoin.await.expect("join task").expect("re-join");
    assert!(network.is_subscribed(&chat));
    registry
        .publish(&chat, b"hi".to_vec())
        .await
        .expect("publish after re-join");
}

#[rstest]
#[tokio::test]
async fn join_racing_a_failed_subscribe_still_subscribes(clock: Arc<MutableClock>) {
    let network = GatedNetwork::new(GatedCall::FailingSubscribe);
    let registry = gated_registry(&network, clock);
    let chat = topic("chat");

    let first = tokio::spawn({
        let registry = registry.clone();
        let chat = chat.clone();
        async move { registry.join(chat, SubscriptionRequest::default()).await }
    });
    network.parked.notified().await;
    let second = tokio::spawn({
        let registry = registry.clone();
        let chat = chat.clone();
        async move { registry.join(chat, SubscriptionRequest::default()).await }
    });
    tokio::task::yield_now().await;
    network.release.notify_one();

    let err = first
        .await
        .expect("first join task")
        .expect_err("subscribe failed");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    second.await.expect("second join task").expect("second join");
    assert!(network.is_subscribed(&chat));
    let listed = registry
        .list(ListTopicsRequest::default())
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
}

#[rstest]
#[tokio::test]
async fn leave_during_join_does_not_leak_a_network_subscription(clock: Arc<MutableClock>) {
    let network = GatedNetwork::new(GatedCall::Subscribe);
    let registry = gated_registry(&network, clock);
    let chat = topic("chat");

    let join = tokio::spawn({
        let registry = registry.clone();
        let chat = chat.clone();
        async move { registry.join(chat, SubscriptionRequest::default()).await }
    });
    network.parked.notified().await;
    let leave = tokio::spawn({
        let registry = registry.clone();
        let chat = chat.clone();
        async move { registry.leave(&chat).await }
    });
    tokio::task::yield_now().await;
    network.release.notify_one();

    join.await.expect("join task").expect("join");
    leave.await.expect("leave task").expect("leave");
    assert!(!network.is_subscribed(&chat));
}
