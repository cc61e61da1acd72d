//! Domain primitives, subscription state and the topic registry.
//!
//! Purpose: model topics, peers, messages and subscription limits, and
//! implement the driving ports in [`ports`] on top of an in-memory
//! [`TopicRegistry`]. Nothing here knows about HTTP.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - TopicName / PeerId / TopicFilter: validated identifiers and selection.
//! - ServiceLimits / SubscriptionConfig / SubscriptionRequest / QueuePolicy:
//!   join-time negotiation.
//! - PubsubMessage / ReadBatch / TopicBatch / TopicSummary: read results.
//! - TopicRegistry: the service implementation.
//! - ExpirySweeper: background expiry task.

pub mod error;
pub mod expiry_sweeper;
pub mod limits;
pub mod message;
pub mod peer;
pub mod ports;
pub mod queue;
pub mod registry;
pub mod subscription;
pub mod topic;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::expiry_sweeper::ExpirySweeper;
pub use self::limits::{ServiceLimits, ServiceLimitsDraft, ServiceLimitsValidationError};
pub use self::message::{
    DeliveryOutcome, PubsubMessage, ReadBatch, ReadOptions, TopicBatch, TopicSummary,
};
pub use self::peer::{PeerId, PeerIdValidationError};
pub use self::queue::{MessageQueue, PushOutcome};
pub use self::registry::TopicRegistry;
pub use self::subscription::{
    ParseQueuePolicyError, QueuePolicy, SubscriptionConfig, SubscriptionRequest,
};
pub use self::topic::{TopicFilter, TopicName, TopicNameValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use pubsub_service::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("not subscribed"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
