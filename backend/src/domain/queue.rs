//! Bounded FIFO of received messages.

use std::collections::VecDeque;

use crate::domain::message::PubsubMessage;
use crate::domain::subscription::QueuePolicy;

/// Result of offering a message to a [`MessageQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The message was appended.
    Queued,
    /// The queue was full; the oldest message was evicted.
    EvictedOldest,
    /// The queue was full; the incoming message was discarded.
    Rejected,
}

/// Bounded message queue with an overflow policy and a drop counter.
///
/// ## Invariants
/// - `len() <= capacity()` at all times.
/// - `dropped` counts messages lost to capacity since the last
///   [`MessageQueue::take_dropped`].
#[derive(Debug, Clone)]
pub struct MessageQueue {
    messages: VecDeque<PubsubMessage>,
    capacity: usize,
    policy: QueuePolicy,
    dropped: u64,
}

impl MessageQueue {
    /// Create an empty queue. A zero capacity is raised to one.
    pub fn new(capacity: usize, policy: QueuePolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity.min(64)),
            capacity,
            policy,
            dropped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Offer a message, applying the overflow policy when full.
    pub fn push(&mut self, message: PubsubMessage) -> PushOutcome {
        if self.messages.len() < self.capacity {
            self.messages.push_back(message);
            return PushOutcome::Queued;
        }
        self.dropped += 1;
        match self.policy {
            QueuePolicy::DropOld => {
                self.messages.pop_front();
                self.messages.push_back(message);
                PushOutcome::EvictedOldest
            }
            QueuePolicy::DropNew => PushOutcome::Rejected,
        }
    }

    /// Remove and return up to `max` messages from the front; all when `None`.
    pub fn take(&mut self, max: Option<usize>) -> Vec<PubsubMessage> {
        let count = max.map_or(self.messages.len(), |max| max.min(self.messages.len()));
        self.messages.drain(..count).collect()
    }

    /// Return the drop counter and reset it.
    pub fn take_dropped(&mut self) -> u64 {
        std::mem::take(&mut self.dropped)
    }

    /// Change capacity and policy. Shrinking evicts by the new policy (oldest
    /// first for drop-old, newest first for drop-new) and counts the evictions
    /// as dropped. Returns the eviction count.
    pub fn reconfigure(&mut self, capacity: usize, policy: QueuePolicy) -> usize {
        self.capacity = capacity.max(1);
        self.policy = policy;
        let excess = self.messages.len().saturating_sub(self.capacity);
        match policy {
            QueuePolicy::DropOld => {
                self.messages.drain(..excess);
            }
            QueuePolicy::DropNew => self.messages.truncate(self.capacity),
        }
        self.dropped += excess as u64;
        excess
    }

    /// Keep only messages matching `keep`. Returns how many were removed;
    /// removals are not counted as dropped.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&PubsubMessage) -> bool,
    {
        let before = self.messages.len();
        self.messages.retain(keep);
        before - self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PeerId;
    use rstest::rstest;

    fn message(payload: u8) -> PubsubMessage {
        PubsubMessage {
            from: PeerId::new("QmPeer").expect("valid peer id"),
            data: vec![payload],
            seqno: Some(u64::from(payload)),
            signature: None,
            key: None,
        }
    }

    fn payloads(messages: &[PubsubMessage]) -> Vec<u8> {
        messages.iter().map(|m| m.data[0]).collect()
    }

    fn filled(capacity: usize, policy: QueuePolicy, count: u8) -> MessageQueue {
        let mut queue = MessageQueue::new(capacity, policy);
        for payload in 0..count {
            queue.push(message(payload));
        }
        queue
    }

    #[rstest]
    #[case(QueuePolicy::DropOld, vec![2, 3, 4])]
    #[case(QueuePolicy::DropNew, vec![0, 1, 2])]
    fn overflow_follows_policy(#[case] policy: QueuePolicy, #[case] expected: Vec<u8>) {
        let mut queue = filled(3, policy, 5);
        assert_eq!(queue.take_dropped(), 2);
        assert_eq!(payloads(&queue.take(None)), expected);
        assert!(queue.is_empty());
    }

    #[rstest]
    fn push_reports_outcome() {
        let mut queue = MessageQueue::new(1, QueuePolicy::DropNew);
        assert_eq!(queue.push(message(0)), PushOutcome::Queued);
        assert_eq!(queue.push(message(1)), PushOutcome::Rejected);
        queue.reconfigure(1, QueuePolicy::DropOld);
        assert_eq!(queue.push(message(2)), PushOutcome::EvictedOldest);
    }

    #[rstest]
    fn take_respects_the_limit() {
        let mut queue = filled(5, QueuePolicy::DropOld, 4);
        assert_eq!(payloads(&queue.take(Some(3))), vec![0, 1, 2]);
        assert_eq!(queue.len(), 1);
        assert!(queue.take(Some(0)).is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[rstest]
    #[case(QueuePolicy::DropOld, vec![3, 4])]
    #[case(QueuePolicy::DropNew, vec![0, 1])]
    fn shrinking_evicts_by_policy(#[case] policy: QueuePolicy, #[case] expected: Vec<u8>) {
        let mut queue = filled(5, QueuePolicy::DropOld, 5);
        assert_eq!(queue.reconfigure(2, policy), 3);
        assert_eq!(queue.capacity(), 2);
        assert_eq!(queue.take_dropped(), 3);
        assert_eq!(payloads(&queue.take(None)), expected);
    }

    #[rstest]
    fn retain_does_not_count_as_dropped() {
        let mut queue = filled(5, QueuePolicy::DropOld, 4);
        assert_eq!(queue.retain(|m| m.data[0] % 2 == 0), 2);
        assert_eq!(queue.take_dropped(), 0);
        assert_eq!(payloads(&queue.take(None)), vec![0, 2]);
    }

    #[rstest]
    fn zero_capacity_is_raised_to_one() {
        assert_eq!(MessageQueue::new(0, QueuePolicy::DropOld).capacity(), 1);
    }
}
