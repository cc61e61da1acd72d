//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `PUBSUB_*` environment variables, command-line flags and
//! an optional configuration file. Every field is optional; the accessors
//! supply defaults and [`ServiceSettings::limits`] validates the combination.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::limits::{
    DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_QUEUE_LENGTH, DEFAULT_MAX_TIMEOUT_SECS,
    DEFAULT_MAX_TOPICS, DEFAULT_QUEUE_LENGTH, DEFAULT_TIMEOUT_SECS,
};
use crate::domain::{
    ParseQueuePolicyError, PeerId, PeerIdValidationError, QueuePolicy, ServiceLimits,
    ServiceLimitsDraft, ServiceLimitsValidationError,
};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BASE_PATH: &str = "/v1";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5;

/// Rejected configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid limits: {0}")]
    Limits(#[from] ServiceLimitsValidationError),
    #[error("invalid default_queue_policy: {0}")]
    QueuePolicy(#[from] ParseQueuePolicyError),
    #[error("invalid peer_id: {0}")]
    PeerId(#[from] PeerIdValidationError),
    #[error("base_path must start with '/' (got {0:?})")]
    BasePath(String),
    #[error("sweep_interval must be greater than zero")]
    SweepInterval,
}

/// Configuration values for the pubsub HTTP service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PUBSUB")]
pub struct ServiceSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Path the topics API is mounted under.
    pub base_path: Option<String>,
    /// Largest queue a subscriber may request.
    pub max_queue_length: Option<u32>,
    /// Longest idle timeout a subscriber may request, in seconds.
    pub max_timeout: Option<u32>,
    /// Largest message accepted, in bytes.
    pub max_message_size: Option<u32>,
    /// Most topics subscribed at once.
    pub max_topics: Option<u32>,
    pub default_queue_length: Option<u32>,
    /// Seconds.
    pub default_timeout: Option<u32>,
    /// `drop-old` or `drop-new`.
    pub default_queue_policy: Option<String>,
    /// Seconds between expiry sweeps.
    pub sweep_interval: Option<u64>,
    /// Identity used as `from` on locally published messages.
    pub peer_id: Option<String>,
}

impl ServiceSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Address tuple accepted by `HttpServer::bind`.
    pub fn bind_address(&self) -> (String, u16) {
        (self.host().to_owned(), self.port())
    }

    /// Mount path without a trailing slash.
    ///
    /// # Errors
    /// Returns [`SettingsError::BasePath`] unless the path starts with `/`.
    pub fn base_path(&self) -> Result<String, SettingsError> {
        let raw = self.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH);
        if !raw.starts_with('/') {
            return Err(SettingsError::BasePath(raw.to_owned()));
        }
        Ok(raw.trim_end_matches('/').to_owned())
    }

    /// # Errors
    /// Returns [`SettingsError::SweepInterval`] for a zero interval.
    pub fn sweep_interval(&self) -> Result<Duration, SettingsError> {
        match self.sweep_interval.unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS) {
            0 => Err(SettingsError::SweepInterval),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Configured peer identity, or a freshly generated one.
    ///
    /// # Errors
    /// Returns [`SettingsError::PeerId`] when the configured value is invalid.
    pub fn peer_id(&self) -> Result<PeerId, SettingsError> {
        match self.peer_id.as_deref() {
            Some(raw) => Ok(PeerId::new(raw)?),
            None => Ok(PeerId::random()),
        }
    }

    /// Validated subscription limits.
    ///
    /// # Errors
    /// Returns [`SettingsError`] for zero limits, defaults above their
    /// maximum or an unknown queue policy.
    pub fn limits(&self) -> Result<ServiceLimits, SettingsError> {
        let default_queue_policy = match self.default_queue_policy.as_deref() {
            Some(raw) => raw.parse::<QueuePolicy>()?,
            None => QueuePolicy::default(),
        };
        let draft = ServiceLimitsDraft {
            max_queue_length: self.max_queue_length.unwrap_or(DEFAULT_MAX_QUEUE_LENGTH),
            max_timeout: self.max_timeout.unwrap_or(DEFAULT_MAX_TIMEOUT_SECS),
            max_message_size: self.max_message_size.unwrap_or(DEFAULT_MAX_MESSAGE_SIZE),
            max_topics: self.max_topics.unwrap_or(DEFAULT_MAX_TOPICS),
            default_queue_length: self.default_queue_length.unwrap_or(DEFAULT_QUEUE_LENGTH),
            default_timeout: self.default_timeout.unwrap_or(DEFAULT_TIMEOUT_SECS),
            default_queue_policy,
        };
        Ok(ServiceLimits::new(draft)?)
    }
}
