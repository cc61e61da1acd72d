//! Per-topic subscription state.
//!
//! A [`Subscription`] owns the bounded queue of messages received for one
//! topic together with the configuration negotiated at join time, the peers
//! filtered out of the topic, and a short de-duplication window of recently
//! seen `(from, seqno)` pairs.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::message::{DeliveryOutcome, PubsubMessage, ReadBatch};
use crate::domain::peer::PeerId;
use crate::domain::queue::{MessageQueue, PushOutcome};

/// Number of `(from, seqno)` pairs remembered for de-duplication.
pub const DEDUPE_WINDOW: usize = 1024;

/// What a full queue does with a newly received message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueuePolicy {
    /// Evict the oldest queued message to admit the new one.
    #[default]
    DropOld,
    /// Discard the incoming message.
    DropNew,
}

impl QueuePolicy {
    /// Every supported policy, in advertised order.
    pub const ALL: [QueuePolicy; 2] = [QueuePolicy::DropOld, QueuePolicy::DropNew];

    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DropOld => "drop-old",
            Self::DropNew => "drop-new",
        }
    }
}

impl fmt::Display for QueuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown queue policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown queue policy `{0}`; expected drop-old or drop-new")]
pub struct ParseQueuePolicyError(String);

impl FromStr for QueuePolicy {
    type Err = ParseQueuePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop-old" => Ok(Self::DropOld),
            "drop-new" => Ok(Self::DropNew),
            other => Err(ParseQueuePolicyError(other.to_owned())),
        }
    }
}

/// Subscription parameters requested by a client. Absent values take the
/// service defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub queue_length: Option<u32>,
    pub queue_policy: Option<QueuePolicy>,
    pub timeout: Option<u32>,
    pub max_message_size: Option<u32>,
}

/// Effective subscription configuration after applying service limits.
///
/// ## Invariants
/// - `queue_length`, `timeout` and `max_message_size` are all at least one.
///
/// Built by [`crate::domain::ServiceLimits::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionConfig {
    queue_length: u32,
    queue_policy: QueuePolicy,
    timeout: u32,
    max_message_size: u32,
}

impl SubscriptionConfig {
    pub(crate) const fn new(
        queue_length: u32,
        queue_policy: QueuePolicy,
        timeout: u32,
        max_message_size: u32,
    ) -> Self {
        Self {
            queue_length,
            queue_policy,
            timeout,
            max_message_size,
        }
    }

    /// Maximum number of queued messages.
    pub const fn queue_length(&self) -> u32 {
        self.queue_length
    }

    /// Behaviour when the queue is full.
    pub const fn queue_policy(&self) -> QueuePolicy {
        self.queue_policy
    }

    /// Inactivity timeout in seconds.
    pub const fn timeout(&self) -> u32 {
        self.timeout
    }

    /// Inactivity timeout as a [`Duration`].
    pub const fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout as u64)
    }

    /// Largest accepted payload in bytes.
    pub const fn max_message_size(&self) -> u32 {
        self.max_message_size
    }

    fn admits(&self, len: usize) -> bool {
        u64::try_from(len).is_ok_and(|len| len <= u64::from(self.max_message_size))
    }
}

/// Live state of one subscribed topic.
#[derive(Debug)]
pub(crate) struct Subscription {
    config: SubscriptionConfig,
    queue: MessageQueue,
    last_active: DateTime<Utc>,
    filtered_peers: HashSet<PeerId>,
    recent: VecDeque<(PeerId, u64)>,
    recent_index: HashSet<(PeerId, u64)>,
    generation: u64,
}

impl Subscription {
    pub(crate) fn new(config: SubscriptionConfig, now: DateTime<Utc>, generation: u64) -> Self {
        Self {
            config,
            queue: MessageQueue::new(config.queue_length() as usize, config.queue_policy()),
            last_active: now,
            filtered_peers: HashSet::new(),
            recent: VecDeque::new(),
            recent_index: HashSet::new(),
            generation,
        }
    }

    pub(crate) fn config(&self) -> SubscriptionConfig {
        self.config
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Expired once `now` is strictly past `last_active + timeout`.
    pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let timeout = TimeDelta::seconds(i64::from(self.config.timeout()));
        now > self.last_active + timeout
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }

    /// Apply a new configuration in place. Returns the number of queued
    /// messages evicted by a smaller queue.
    pub(crate) fn reconfigure(&mut self, config: SubscriptionConfig) -> usize {
        if self.config == config {
            return 0;
        }
        self.config = config;
        self.queue
            .reconfigure(config.queue_length() as usize, config.queue_policy())
    }

    pub(crate) fn is_oversized(&self, len: usize) -> bool {
        !self.config.admits(len)
    }

    /// Block `peer` and purge its queued messages. Returns the purge count.
    pub(crate) fn filter_peer(&mut self, peer: PeerId) -> usize {
        let purged = self.queue.retain(|message| message.from != peer);
        self.filtered_peers.insert(peer);
        purged
    }

    pub(crate) fn accept(&mut self, message: PubsubMessage) -> DeliveryOutcome {
        if self.filtered_peers.contains(&message.from) {
            return DeliveryOutcome::FilteredPeer;
        }
        if self.is_oversized(message.data.len()) {
            return DeliveryOutcome::Oversized;
        }
        if let Some(seqno) = message.seqno {
            let key = (message.from.clone(), seqno);
            if self.recent_index.contains(&key) {
                return DeliveryOutcome::Duplicate;
            }
            self.remember(key);
        }
        match self.queue.push(message) {
            PushOutcome::Queued => DeliveryOutcome::Queued,
            PushOutcome::EvictedOldest => DeliveryOutcome::EvictedOldest,
            PushOutcome::Rejected => DeliveryOutcome::DroppedNew,
        }
    }

    /// Pop up to `max` messages and report drops since the previous read.
    pub(crate) fn read(&mut self, max: Option<usize>, include_signature: bool) -> ReadBatch {
        let messages = self
            .queue
            .take(max)
            .into_iter()
            .map(|message| {
                if include_signature {
                    message
                } else {
                    message.without_signature()
                }
            })
            .collect();
        ReadBatch {
            messages_dropped: self.queue.take_dropped(),
            messages_remaining: self.queue.len() as u64,
            messages,
        }
    }

    fn remember(&mut self, key: (PeerId, u64)) {
        if self.recent.len() == DEDUPE_WINDOW {
            if let Some(oldest) = self.recent.pop_front() {
                self.recent_index.remove(&oldest);
            }
        }
        self.recent_index.insert(key.clone());
        self.recent.push_back(key);
    }
}
