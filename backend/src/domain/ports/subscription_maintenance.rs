//! Driving port for background subscription housekeeping.

use async_trait::async_trait;

use crate::domain::{Error, TopicName};

/// Port used by the expiry sweeper.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionMaintenance: Send + Sync {
    /// Remove every expired subscription and return the removed topics.
    async fn sweep_expired(&self) -> Result<Vec<TopicName>, Error>;
}
