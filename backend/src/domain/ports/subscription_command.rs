//! Driving port for subscription lifecycle operations.

use async_trait::async_trait;

use crate::domain::{
    Error, PeerId, ServiceLimits, SubscriptionConfig, SubscriptionRequest, TopicName,
};

/// Driving port for joining, leaving and filtering topics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionCommand: Send + Sync {
    /// Subscribe to `topic`, or refresh an existing subscription.
    ///
    /// Returns the effective configuration after clamping `request` to the
    /// service limits. Joining an already subscribed topic is idempotent and
    /// resets its inactivity timeout.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use pubsub_service::domain::{SubscriptionRequest, TopicName};
    /// # use pubsub_service::domain::ports::{FixtureSubscriptionCommand, SubscriptionCommand};
    /// # async fn example() -> Result<(), pubsub_service::domain::Error> {
    /// let command = FixtureSubscriptionCommand;
    /// let topic = TopicName::new("chat").expect("valid topic");
    /// let config = command.join(topic, SubscriptionRequest::default()).await?;
    /// assert_eq!(config.queue_length(), 20);
    /// # Ok(())
    /// # }
    /// ```
    async fn join(
        &self,
        topic: TopicName,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionConfig, Error>;

    /// Drop the subscription and every queued message.
    async fn leave(&self, topic: &TopicName) -> Result<(), Error>;

    /// Ignore messages from `peer` on `topic` and purge those already queued.
    async fn filter_peer(&self, topic: &TopicName, peer: PeerId) -> Result<(), Error>;
}

/// Fixture command that resolves joins against the default limits and
/// accepts everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubscriptionCommand;

#[async_trait]
impl SubscriptionCommand for FixtureSubscriptionCommand {
    async fn join(
        &self,
        _topic: TopicName,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionConfig, Error> {
        ServiceLimits::default().resolve(&request)
    }

    async fn leave(&self, _topic: &TopicName) -> Result<(), Error> {
        Ok(())
    }

    async fn filter_peer(&self, _topic: &TopicName, _peer: PeerId) -> Result<(), Error> {
        Ok(())
    }
}
