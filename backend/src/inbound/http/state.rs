//! Shared HTTP adapter state.
//!
//! [`ServiceApi`](super::service_api::ServiceApi) holds this state so handlers
//! only depend on domain ports and remain testable without a network.

use std::sync::Arc;

use crate::domain::TopicRegistry;
use crate::domain::ports::{
    FixtureMessageCommand, FixtureSubscriptionCommand, FixtureTopicQuery, MessageCommand,
    SubscriptionCommand, TopicQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub subscriptions: Arc<dyn SubscriptionCommand>,
    pub messages: Arc<dyn MessageCommand>,
    pub topics: Arc<dyn TopicQuery>,
}

impl HttpState {
    /// Construct state from individual ports.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionCommand>,
        messages: Arc<dyn MessageCommand>,
        topics: Arc<dyn TopicQuery>,
    ) -> Self {
        Self {
            subscriptions,
            messages,
            topics,
        }
    }

    /// Serve every port from one registry.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use pubsub_service::domain::ports::FixturePubsubNetwork;
    /// use pubsub_service::domain::{ServiceLimits, TopicRegistry};
    /// use pubsub_service::inbound::http::state::HttpState;
    ///
    /// let registry = Arc::new(TopicRegistry::new(
    ///     Arc::new(FixturePubsubNetwork),
    ///     Arc::new(DefaultClock),
    ///     ServiceLimits::default(),
    /// ));
    /// let _state = HttpState::from_registry(registry);
    /// ```
    pub fn from_registry(registry: Arc<TopicRegistry>) -> Self {
        Self {
            subscriptions: registry.clone(),
            messages: registry.clone(),
            topics: registry,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureSubscriptionCommand),
            Arc::new(FixtureMessageCommand),
            Arc::new(FixtureTopicQuery),
        )
    }
}
