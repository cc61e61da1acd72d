//! Port through which network adapters hand over received messages.

use crate::domain::{DeliveryOutcome, PubsubMessage, TopicName};

/// Synchronous entry point for messages arriving from the network.
///
/// Implementations must not block: adapters call this from their receive
/// loop.
#[cfg_attr(test, mockall::automock)]
pub trait InboundMessageSink: Send + Sync {
    /// Queue `message` for `topic` if a live subscription accepts it.
    fn deliver(&self, topic: &TopicName, message: PubsubMessage) -> DeliveryOutcome;
}
