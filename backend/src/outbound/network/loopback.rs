//! In-process loopback implementation of the pubsub network port.
//!
//! Messages published on a subscribed topic are stamped with the local peer
//! id and a sequence number, then travel over a bounded tokio channel to a
//! [`LoopbackReceiver`] that hands them to the domain's inbound sink.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::domain::ports::{InboundMessageSink, NetworkError, PubsubNetwork};
use crate::domain::{PeerId, PubsubMessage, TopicName};

type Envelope = (TopicName, PubsubMessage);

/// Build a connected network/receiver pair buffering up to `capacity`
/// in-flight messages.
///
/// # Examples
/// ```
/// use pubsub_service::domain::PeerId;
/// use pubsub_service::outbound::network::loopback;
///
/// let (network, _receiver) = loopback(PeerId::random(), 64);
/// assert!(network.subscribed_topics().is_empty());
/// ```
pub fn loopback(local_peer: PeerId, capacity: usize) -> (LoopbackNetwork, LoopbackReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        LoopbackNetwork {
            local_peer,
            subscribed: Mutex::new(HashSet::new()),
            next_seqno: AtomicU64::new(1),
            sender,
        },
        LoopbackReceiver { receiver },
    )
}

/// Publishing side of the loopback network.
pub struct LoopbackNetwork {
    local_peer: PeerId,
    subscribed: Mutex<HashSet<TopicName>>,
    next_seqno: AtomicU64,
    sender: mpsc::Sender<Envelope>,
}

impl LoopbackNetwork {
    pub fn local_peer(&self) -> &PeerId {
        &self.local_peer
    }

    /// Topics currently subscribed, in no particular order.
    pub fn subscribed_topics(&self) -> Vec<TopicName> {
        self.subscribed
            .lock()
            .map(|topics| topics.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn with_topics<T>(
        &self,
        f: impl FnOnce(&mut HashSet<TopicName>) -> T,
    ) -> Result<T, NetworkError> {
        let mut topics = self
            .subscribed
            .lock()
            .map_err(|_| NetworkError::unavailable("subscription table lock poisoned"))?;
        Ok(f(&mut topics))
    }
}

#[async_trait]
impl PubsubNetwork for LoopbackNetwork {
    async fn subscribe(&self, topic: &TopicName) -> Result<(), NetworkError> {
        if self.with_topics(|topics| topics.insert(topic.clone()))? {
            debug!(%topic, "loopback subscribed");
        }
        Ok(())
    }

    async fn unsubscribe(&self, topic: &TopicName) -> Result<(), NetworkError> {
        if self.with_topics(|topics| topics.remove(topic))? {
            debug!(%topic, "loopback unsubscribed");
        }
        Ok(())
    }

    async fn publish(&self, topic: &TopicName, data: Vec<u8>) -> Result<(), NetworkError> {
        if !self.with_topics(|topics| topics.contains(topic))? {
            return Err(NetworkError::rejected(format!(
                "topic {topic} is not subscribed"
            )));
        }
        let message = PubsubMessage {
            from: self.local_peer.clone(),
            data,
            seqno: Some(self.next_seqno.fetch_add(1, Ordering::Relaxed)),
            signature: None,
            key: None,
        };
        self.sender
            .send((topic.clone(), message))
            .await
            .map_err(|_| NetworkError::unavailable("loopback receiver stopped"))
    }
}

/// Receiving side of the loopback network.
pub struct LoopbackReceiver {
    receiver: mpsc::Receiver<Envelope>,
}

impl LoopbackReceiver {
    /// Deliver messages to `sink` until every [`LoopbackNetwork`] handle is
    /// dropped. Returns the number of messages handed over.
    pub async fn run(mut self, sink: Arc<dyn InboundMessageSink>) -> u64 {
        let mut delivered = 0;
        while let Some((topic, message)) = self.receiver.recv().await {
            let outcome = sink.deliver(&topic, message);
            trace!(%topic, ?outcome, "loopback delivery");
            delivered += 1;
        }
        debug!(delivered, "loopback receiver finished");
        delivered
    }
}
