//! Driven port for the pubsub network the service participates in.
//!
//! Received messages do not travel through this port: adapters push them into
//! an [`InboundMessageSink`](super::InboundMessageSink) instead.

use async_trait::async_trait;

use crate::domain::TopicName;

use super::define_port_error;

define_port_error! {
    /// Errors raised by pubsub network adapters.
    pub enum NetworkError {
        /// The network node cannot be reached.
        Unavailable { message: String } => "pubsub network unavailable: {message}",
        /// The node refused the operation.
        Rejected { message: String } => "pubsub network rejected the request: {message}",
    }
}

/// Port for joining, leaving and publishing on network topics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PubsubNetwork: Send + Sync {
    /// Start receiving messages for `topic`. Subscribing twice is harmless.
    async fn subscribe(&self, topic: &TopicName) -> Result<(), NetworkError>;

    /// Stop receiving messages for `topic`.
    async fn unsubscribe(&self, topic: &TopicName) -> Result<(), NetworkError>;

    /// Broadcast `data` on `topic`.
    async fn publish(&self, topic: &TopicName, data: Vec<u8>) -> Result<(), NetworkError>;
}

/// Fixture network that accepts every operation and delivers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePubsubNetwork;

#[async_trait]
impl PubsubNetwork for FixturePubsubNetwork {
    async fn subscribe(&self, _topic: &TopicName) -> Result<(), NetworkError> {
        Ok(())
    }

    async fn unsubscribe(&self, _topic: &TopicName) -> Result<(), NetworkError> {
        Ok(())
    }

    async fn publish(&self, _topic: &TopicName, _data: Vec<u8>) -> Result<(), NetworkError> {
        Ok(())
    }
}
