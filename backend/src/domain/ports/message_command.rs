//! Driving port for publishing and consuming messages.

use async_trait::async_trait;

use crate::domain::{Error, ReadBatch, ReadOptions, TopicBatch, TopicFilter, TopicName};

/// Driving port for message traffic on subscribed topics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageCommand: Send + Sync {
    /// Broadcast `data` on a subscribed topic.
    async fn publish(&self, topic: &TopicName, data: Vec<u8>) -> Result<(), Error>;

    /// Consume queued messages from one topic.
    async fn read(&self, topic: &TopicName, options: ReadOptions) -> Result<ReadBatch, Error>;

    /// Consume queued messages from every matching topic in name order.
    ///
    /// `options.max_messages` bounds the total across all topics.
    async fn read_all(
        &self,
        filter: TopicFilter,
        options: ReadOptions,
    ) -> Result<Vec<TopicBatch>, Error>;
}

/// Fixture command backed by no topics: publishes succeed and reads are empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessageCommand;

#[async_trait]
impl MessageCommand for FixtureMessageCommand {
    async fn publish(&self, _topic: &TopicName, _data: Vec<u8>) -> Result<(), Error> {
        Ok(())
    }

    async fn read(&self, _topic: &TopicName, _options: ReadOptions) -> Result<ReadBatch, Error> {
        Ok(ReadBatch::default())
    }

    async fn read_all(
        &self,
        _filter: TopicFilter,
        _options: ReadOptions,
    ) -> Result<Vec<TopicBatch>, Error> {
        Ok(Vec::new())
    }
}
