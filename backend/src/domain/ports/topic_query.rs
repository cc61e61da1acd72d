//! Driving port for read-only topic queries.

use async_trait::async_trait;

use crate::domain::{Error, ServiceLimits, TopicFilter, TopicSummary};

/// Listing request: a name filter, an exclusive cursor and a page size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTopicsRequest {
    pub filter: TopicFilter,
    /// Only topics sorting strictly after this name are returned.
    pub after: Option<String>,
    /// Upper bound on returned topics; unbounded when `None`.
    pub max_topics: Option<u32>,
}

/// Driving port for listing subscriptions and advertising limits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicQuery: Send + Sync {
    /// Live subscriptions in lexicographic order. Does not refresh liveness.
    async fn list(&self, request: ListTopicsRequest) -> Result<Vec<TopicSummary>, Error>;

    /// Limits a client may request at join time.
    async fn discovery(&self) -> Result<ServiceLimits, Error>;
}

/// Fixture query with no subscriptions and default limits.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTopicQuery;

#[async_trait]
impl TopicQuery for FixtureTopicQuery {
    async fn list(&self, _request: ListTopicsRequest) -> Result<Vec<TopicSummary>, Error> {
        Ok(Vec::new())
    }

    async fn discovery(&self) -> Result<ServiceLimits, Error> {
        Ok(ServiceLimits::default())
    }
}
