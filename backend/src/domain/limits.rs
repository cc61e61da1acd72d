//! Service-wide subscription limits and the defaults applied at join time.

use crate::domain::Error;
use crate::domain::subscription::{QueuePolicy, SubscriptionConfig, SubscriptionRequest};

pub const DEFAULT_MAX_QUEUE_LENGTH: u32 = 1000;
pub const DEFAULT_MAX_TIMEOUT_SECS: u32 = 3600;
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 1024 * 1024;
pub const DEFAULT_MAX_TOPICS: u32 = 256;
pub const DEFAULT_QUEUE_LENGTH: u32 = 20;
pub const DEFAULT_TIMEOUT_SECS: u32 = 600;

/// Validation errors raised by [`ServiceLimits::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceLimitsValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} ({value}) must not exceed {max_field} ({max})")]
    DefaultAboveMaximum {
        field: &'static str,
        value: u32,
        max_field: &'static str,
        max: u32,
    },
}

/// Unvalidated input for [`ServiceLimits::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimitsDraft {
    pub max_queue_length: u32,
    pub max_timeout: u32,
    pub max_message_size: u32,
    pub max_topics: u32,
    pub default_queue_length: u32,
    pub default_timeout: u32,
    pub default_queue_policy: QueuePolicy,
}

impl Default for ServiceLimitsDraft {
    fn default() -> Self {
        Self {
            max_queue_length: DEFAULT_MAX_QUEUE_LENGTH,
            max_timeout: DEFAULT_MAX_TIMEOUT_SECS,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_topics: DEFAULT_MAX_TOPICS,
            default_queue_length: DEFAULT_QUEUE_LENGTH,
            default_timeout: DEFAULT_TIMEOUT_SECS,
            default_queue_policy: QueuePolicy::DropOld,
        }
    }
}

/// Limits advertised by discovery and enforced by join.
///
/// ## Invariants
/// - Every maximum is at least one.
/// - Defaults are at least one and never exceed their maximum.
///
/// # Examples
/// ```
/// use pubsub_service::domain::{ServiceLimits, SubscriptionRequest};
///
/// let limits = ServiceLimits::default();
/// let config = limits
///     .resolve(&SubscriptionRequest {
///         queue_length: Some(50_000),
///         ..SubscriptionRequest::default()
///     })
///     .expect("valid request");
/// assert_eq!(config.queue_length(), limits.max_queue_length());
/// assert_eq!(config.timeout(), 600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    max_queue_length: u32,
    max_timeout: u32,
    max_message_size: u32,
    max_topics: u32,
    default_queue_length: u32,
    default_timeout: u32,
    default_queue_policy: QueuePolicy,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        let draft = ServiceLimitsDraft::default();
        Self {
            max_queue_length: draft.max_queue_length,
            max_timeout: draft.max_timeout,
            max_message_size: draft.max_message_size,
            max_topics: draft.max_topics,
            default_queue_length: draft.default_queue_length,
            default_timeout: draft.default_timeout,
            default_queue_policy: draft.default_queue_policy,
        }
    }
}

impl ServiceLimits {
    /// Validate a draft.
    pub fn new(draft: ServiceLimitsDraft) -> Result<Self, ServiceLimitsValidationError> {
        for (field, value) in [
            ("max_queue_length", draft.max_queue_length),
            ("max_timeout", draft.max_timeout),
            ("max_message_size", draft.max_message_size),
            ("max_topics", draft.max_topics),
            ("default_queue_length", draft.default_queue_length),
            ("default_timeout", draft.default_timeout),
        ] {
            if value == 0 {
                return Err(ServiceLimitsValidationError::Zero { field });
            }
        }
        if draft.default_queue_length > draft.max_queue_length {
            return Err(ServiceLimitsValidationError::DefaultAboveMaximum {
                field: "default_queue_length",
                value: draft.default_queue_length,
                max_field: "max_queue_length",
                max: draft.max_queue_length,
            });
        }
        if draft.default_timeout > draft.max_timeout {
            return Err(ServiceLimitsValidationError::DefaultAboveMaximum {
                field: "default_timeout",
                value: draft.default_timeout,
                max_field: "max_timeout",
                max: draft.max_timeout,
            });
        }
        Ok(Self {
            max_queue_length: draft.max_queue_length,
            max_timeout: draft.max_timeout,
            max_message_size: draft.max_message_size,
            max_topics: draft.max_topics,
            default_queue_length: draft.default_queue_length,
            default_timeout: draft.default_timeout,
            default_queue_policy: draft.default_queue_policy,
        })
    }

    pub const fn max_queue_length(&self) -> u32 {
        self.max_queue_length
    }

    pub const fn max_timeout(&self) -> u32 {
        self.max_timeout
    }

    pub const fn max_message_size(&self) -> u32 {
        self.max_message_size
    }

    pub const fn max_topics(&self) -> u32 {
        self.max_topics
    }

    pub const fn default_queue_length(&self) -> u32 {
        self.default_queue_length
    }

    pub const fn default_timeout(&self) -> u32 {
        self.default_timeout
    }

    pub const fn default_queue_policy(&self) -> QueuePolicy {
        self.default_queue_policy
    }

    /// Resolve a client request into an effective configuration.
    ///
    /// Absent values take the defaults, values above a maximum are clamped,
    /// and explicit zeroes are rejected with `invalid_request`.
    pub fn resolve(&self, request: &SubscriptionRequest) -> Result<SubscriptionConfig, Error> {
        let queue_length = Self::pick(
            "queue-length",
            request.queue_length,
            self.default_queue_length,
            self.max_queue_length,
        )?;
        let timeout = Self::pick(
            "timeout",
            request.timeout,
            self.default_timeout,
            self.max_timeout,
        )?;
        let max_message_size = Self::pick(
            "max-message-size",
            request.max_message_size,
            self.max_message_size,
            self.max_message_size,
        )?;
        let queue_policy = request.queue_policy.unwrap_or(self.default_queue_policy);
        Ok(SubscriptionConfig::new(
            queue_length,
            queue_policy,
            timeout,
            max_message_size,
        ))
    }

    fn pick(field: &str, requested: Option<u32>, default: u32, max: u32) -> Result<u32, Error> {
        match requested {
            None => Ok(default),
            Some(0) => Err(Error::invalid_request(format!(
                "{field} must be greater than zero"
            ))),
            Some(value) => Ok(value.min(max)),
        }
    }
}
