//! Pubsub service library modules.
//!
//! Hexagonal layout: [`domain`] holds topic subscriptions and their ports,
//! [`inbound`] adapts them to HTTP and [`outbound`] provides the pubsub
//! network adapter.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
