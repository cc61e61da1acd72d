//! HTTP server configuration object and helpers.

use std::time::Duration;

use pubsub_service::domain::{PeerId, ServiceLimits};
use pubsub_service::settings::{ServiceSettings, SettingsError};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Messages buffered between the loopback network and the registry.
const DELIVERY_BUFFER: usize = 1024;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: (String, u16),
    pub(crate) base_path: String,
    pub(crate) limits: ServiceLimits,
    pub(crate) peer_id: PeerId,
    pub(crate) sweep_interval: Duration,
    pub(crate) delivery_buffer: usize,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration with default limits.
    #[must_use]
    pub fn new(bind_addr: (String, u16)) -> Self {
        Self {
            bind_addr,
            base_path: "/v1".to_owned(),
            limits: ServiceLimits::default(),
            peer_id: PeerId::random(),
            sweep_interval: Duration::from_secs(5),
            delivery_buffer: DELIVERY_BUFFER,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Validate loaded settings into a server configuration.
    ///
    /// # Errors
    /// Propagates [`SettingsError`] for any invalid value.
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(settings.bind_address())
            .with_base_path(settings.base_path()?)
            .with_limits(settings.limits()?)
            .with_peer_id(settings.peer_id()?)
            .with_sweep_interval(settings.sweep_interval()?))
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: String) -> Self {
        self.base_path = base_path;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ServiceLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_peer_id(mut self, peer_id: PeerId) -> Self {
        self.peer_id = peer_id;
        self
    }

    #[must_use]
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Return the address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by server tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> &(String, u16) {
        &self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
