//! Pubsub messages and the batches returned by reads.

use crate::domain::peer::PeerId;
use crate::domain::subscription::SubscriptionConfig;
use crate::domain::topic::TopicName;

/// A message received from (or looped back by) the pubsub network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubsubMessage {
    /// Originating peer.
    pub from: PeerId,
    /// Opaque payload.
    pub data: Vec<u8>,
    /// Sender-assigned sequence number, used for de-duplication.
    pub seqno: Option<u64>,
    /// Signature over the message, when the network signs messages.
    pub signature: Option<Vec<u8>>,
    /// Public key of the signer, when not derivable from `from`.
    pub key: Option<Vec<u8>>,
}

impl PubsubMessage {
    /// Strip the signing metadata (`seqno`, `signature`, `key`).
    #[must_use]
    pub fn without_signature(self) -> Self {
        Self {
            seqno: None,
            signature: None,
            key: None,
            ..self
        }
    }
}

/// Messages consumed from a single topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadBatch {
    /// Messages lost to queue capacity since the previous read.
    pub messages_dropped: u64,
    /// Messages still queued after this read.
    pub messages_remaining: u64,
    pub messages: Vec<PubsubMessage>,
}

/// A [`ReadBatch`] tagged with its topic, as returned by multi-topic reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBatch {
    pub topic: TopicName,
    pub batch: ReadBatch,
}

/// A live subscription as reported by listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSummary {
    pub topic: TopicName,
    pub config: SubscriptionConfig,
}

/// What happened to a message handed to the inbound sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Appended to the topic queue.
    Queued,
    /// Appended after evicting the oldest queued message.
    EvictedOldest,
    /// Discarded because the queue was full under drop-new.
    DroppedNew,
    /// No live subscription exists for the topic.
    UnknownTopic,
    /// The sender is filtered on this topic.
    FilteredPeer,
    /// The payload exceeds the subscription's message size limit.
    Oversized,
    /// The `(from, seqno)` pair was seen recently.
    Duplicate,
    /// The registry could not be accessed.
    Failed,
}

impl DeliveryOutcome {
    /// Whether the message ended up in the queue.
    pub const fn is_queued(self) -> bool {
        matches!(self, Self::Queued | Self::EvictedOldest)
    }
}

/// Options shared by single and multi-topic reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Upper bound on returned messages; unbounded when `None`.
    pub max_messages: Option<u32>,
    /// Keep `seqno`, `signature` and `key` on returned messages.
    pub include_signature: bool,
}
