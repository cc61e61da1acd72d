//! In-memory topic registry implementing the subscription driving ports.
//!
//! All subscription state lives behind a single [`Mutex`]. The lock is taken
//! for short synchronous sections only and is always released before the
//! registry awaits the network port.
//!
//! Changes to network membership (creating, leaving or expiring a topic) are
//! serialised by a separate async lock held across the network call, so the
//! map and the network subscriptions cannot drift apart.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    InboundMessageSink, ListTopicsRequest, MessageCommand, NetworkError, PubsubNetwork,
    SubscriptionCommand, SubscriptionMaintenance, TopicQuery,
};
use crate::domain::subscription::Subscription;
use crate::domain::{
    DeliveryOutcome, Error, PeerId, PubsubMessage, ReadBatch, ReadOptions, ServiceLimits,
    SubscriptionConfig, SubscriptionRequest, TopicBatch, TopicFilter, TopicName, TopicSummary,
};

type Topics = BTreeMap<TopicName, Subscription>;

/// Registry of live topic subscriptions.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use pubsub_service::domain::ports::{FixturePubsubNetwork, SubscriptionCommand};
/// use pubsub_service::domain::{ServiceLimits, SubscriptionRequest, TopicName, TopicRegistry};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let registry = TopicRegistry::new(
///     Arc::new(FixturePubsubNetwork),
///     Arc::new(DefaultClock),
///     ServiceLimits::default(),
/// );
/// let topic = TopicName::new("chat").expect("valid topic");
/// let config = registry
///     .join(topic, SubscriptionRequest::default())
///     .await
///     .expect("join succeeds");
/// assert_eq!(config.queue_length(), 20);
/// # });
/// ```
pub struct TopicRegistry {
    topics: Mutex<Topics>,
    membership: AsyncMutex<()>,
    network: Arc<dyn PubsubNetwork>,
    clock: Arc<dyn Clock>,
    limits: ServiceLimits,
    generations: AtomicU64,
}

enum JoinOutcome {
    Refreshed { evicted: usize },
    Created { generation: u64 },
}

impl TopicRegistry {
    pub fn new(
        network: Arc<dyn PubsubNetwork>,
        clock: Arc<dyn Clock>,
        limits: ServiceLimits,
    ) -> Self {
        Self {
            topics: Mutex::new(BTreeMap::new()),
            membership: AsyncMutex::new(()),
            network,
            clock,
            limits,
            generations: AtomicU64::new(0),
        }
    }

    /// Limits enforced by this registry.
    pub fn limits(&self) -> ServiceLimits {
        self.limits
    }

    fn lock(&self) -> Result<MutexGuard<'_, Topics>, Error> {
        self.topics.lock().map_err(|_| {
            error!("topic registry lock poisoned");
            Error::internal("topic registry lock poisoned")
        })
    }

    fn not_subscribed(topic: &TopicName) -> Error {
        Error::not_found(format!("not subscribed to topic {topic}"))
    }

    fn live<'a>(
        topics: &'a mut Topics,
        topic: &TopicName,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<&'a mut Subscription, Error> {
        match topics.get_mut(topic) {
            Some(subscription) if !subscription.is_expired(now) => Ok(subscription),
            _ => Err(Self::not_subscribed(topic)),
        }
    }

    fn network_error(topic: &TopicName, err: NetworkError) -> Error {
        warn!(%topic, error = %err, "pubsub network call failed");
        Error::service_unavailable(err.to_string())
    }

    fn try_join(
        &self,
        topic: &TopicName,
        config: SubscriptionConfig,
    ) -> Result<JoinOutcome, Error> {
        let now = self.clock.utc();
        let mut topics = self.lock()?;
        if let Some(subscription) = topics.get_mut(topic) {
            if !subscription.is_expired(now) {
                let evicted = subscription.reconfigure(config);
                subscription.touch(now);
                return Ok(JoinOutcome::Refreshed { evicted });
            }
        }

        let live = topics
            .iter()
            .filter(|(name, subscription)| *name != topic && !subscription.is_expired(now))
            .count();
        if live >= self.limits.max_topics() as usize {
            return Err(Error::quota_exceeded(format!(
                "at most {} topics may be subscribed",
                self.limits.max_topics()
            )));
        }

        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        topics.insert(topic.clone(), Subscription::new(config, now, generation));
        Ok(JoinOutcome::Created { generation })
    }

    /// Undo a creation whose network subscribe failed, unless a later join
    /// already replaced it.
    fn rollback(&self, topic: &TopicName, generation: u64) -> Result<(), Error> {
        let mut topics = self.lock()?;
        if topics
            .get(topic)
            .is_some_and(|subscription| subscription.generation() == generation)
        {
            topics.remove(topic);
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionCommand for TopicRegistry {
    async fn join(
        &self,
        topic: TopicName,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionConfig, Error> {
        let config = self.limits.resolve(&request)?;
        let _membership = self.membership.lock().await;
        match self.try_join(&topic, config)? {
            JoinOutcome::Refreshed { evicted } => {
                if evicted > 0 {
                    debug!(%topic, evicted, "queue shrunk by re-join");
                }
                debug!(%topic, "subscription refreshed");
            }
            JoinOutcome::Created { generation } => {
                if let Err(err) = self.network.subscribe(&topic).await {
                    self.rollback(&topic, generation)?;
                    return Err(Self::network_error(&topic, err));
                }
                info!(
                    %topic,
                    queue_length = config.queue_length(),
                    queue_policy = %config.queue_policy(),
                    timeout = config.timeout(),
                    "joined topic"
                );
            }
        }
        Ok(config)
    }

    async fn leave(&self, topic: &TopicName) -> Result<(), Error> {
        let _membership = self.membership.lock().await;
        let now = self.clock.utc();
        let removed = self.lock()?.remove(topic);
        let Some(subscription) = removed else {
            return Err(Self::not_subscribed(topic));
        };
        if let Err(err) = self.network.unsubscribe(topic).await {
            warn!(%topic, error = %err, "network unsubscribe failed");
        }
        if subscription.is_expired(now) {
            debug!(%topic, "left topic after expiry");
            return Err(Self::not_subscribed(topic));
        }
        info!(%topic, discarded = subscription.queued(), "left topic");
        Ok(())
    }

    async fn filter_peer(&self, topic: &TopicName, peer: PeerId) -> Result<(), Error> {
        let now = self.clock.utc();
        let mut topics = self.lock()?;
        let subscription = Self::live(&mut topics, topic, now)?;
        let purged = subscription.filter_peer(peer.clone());
        info!(%topic, %peer, purged, "peer filtered");
        Ok(())
    }
}

#[async_trait]
impl MessageCommand for TopicRegistry {
    async fn publish(&self, topic: &TopicName, data: Vec<u8>) -> Result<(), Error> {
        let now = self.clock.utc();
        {
            let mut topics = self.lock()?;
            let subscription = Self::live(&mut topics, topic, now)?;
            if subscription.is_oversized(data.len()) {
                return Err(Error::payload_too_large(format!(
                    "message of {} bytes exceeds the {} byte limit",
                    data.len(),
                    subscription.config().max_message_size()
                )));
            }
            subscription.touch(now);
        }
        let size = data.len();
        self.network
            .publish(topic, data)
            .await
            .map_err(|err| Self::network_error(topic, err))?;
        debug!(%topic, size, "published message");
        Ok(())
    }

    async fn read(&self, topic: &TopicName, options: ReadOptions) -> Result<ReadBatch, Error> {
        let now = self.clock.utc();
        let mut topics = self.lock()?;
        let subscription = Self::live(&mut topics, topic, now)?;
        subscription.touch(now);
        let batch = subscription.read(
            options.max_messages.map(|max| max as usize),
            options.include_signature,
        );
        if batch.messages_dropped > 0 {
            debug!(%topic, dropped = batch.messages_dropped, "messages dropped since last read");
        }
        Ok(batch)
    }

    async fn read_all(
        &self,
        filter: TopicFilter,
        options: ReadOptions,
    ) -> Result<Vec<TopicBatch>, Error> {
        let now = self.clock.utc();
        let mut budget = options.max_messages.map(|max| max as usize);
        let mut topics = self.lock()?;
        let mut batches = Vec::new();
        for (topic, subscription) in topics.iter_mut() {
            if subscription.is_expired(now) || !filter.matches(topic) {
                continue;
            }
            subscription.touch(now);
            let batch = subscription.read(budget, options.include_signature);
            if let Some(remaining) = budget.as_mut() {
                *remaining -= batch.messages.len();
            }
            batches.push(TopicBatch {
                topic: topic.clone(),
                batch,
            });
        }
        Ok(batches)
    }
}

#[async_trait]
impl TopicQuery for TopicRegistry {
    async fn list(&self, request: ListTopicsRequest) -> Result<Vec<TopicSummary>, Error> {
        let now = self.clock.utc();
        let topics = self.lock()?;
        let limit = request.max_topics.map_or(usize::MAX, |max| max as usize);
        let after = request.after.as_deref();
        Ok(topics
            .iter()
            .filter(|(topic, _)| after.is_none_or(|after| topic.as_str() > after))
            .filter(|(topic, subscription)| {
                !subscription.is_expired(now) && request.filter.matches(topic)
            })
            .take(limit)
            .map(|(topic, subscription)| TopicSummary {
                topic: topic.clone(),
                config: subscription.config(),
            })
            .collect())
    }

    async fn discovery(&self) -> Result<ServiceLimits, Error> {
        Ok(self.limits)
    }
}

#[async_trait]
impl SubscriptionMaintenance for TopicRegistry {
    async fn sweep_expired(&self) -> Result<Vec<TopicName>, Error> {
        let _membership = self.membership.lock().await;
        let now = self.clock.utc();
        let removed: Vec<TopicName> = {
            let mut topics = self.lock()?;
            let expired: Vec<TopicName> = topics
                .iter()
                .filter(|(_, subscription)| subscription.is_expired(now))
                .map(|(topic, _)| topic.clone())
                .collect();
            for topic in &expired {
                topics.remove(topic);
            }
            expired
        };

        for topic in &removed {
            info!(%topic, "subscription expired");
            if let Err(err) = self.network.unsubscribe(topic).await {
                warn!(%topic, error = %err, "network unsubscribe failed");
            }
        }
        Ok(removed)
    }
}

impl InboundMessageSink for TopicRegistry {
    fn deliver(&self, topic: &TopicName, message: PubsubMessage) -> DeliveryOutcome {
        let now = self.clock.utc();
        let Ok(mut topics) = self.lock() else {
            return DeliveryOutcome::Failed;
        };
        let outcome = match topics.get_mut(topic) {
            Some(subscription) if !subscription.is_expired(now) => subscription.accept(message),
            _ => DeliveryOutcome::UnknownTopic,
        };
        match outcome {
            DeliveryOutcome::Queued | DeliveryOutcome::UnknownTopic => {}
            other => debug!(%topic, outcome = ?other, "message not queued as received"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests;
