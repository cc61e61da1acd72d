//! Builders wiring the topic registry, its network and background tasks.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tokio::task::JoinHandle;
use tracing::{error, info};

use pubsub_service::domain::ports::InboundMessageSink;
use pubsub_service::domain::{ExpirySweeper, TopicRegistry};
use pubsub_service::inbound::http::api::PubsubApi;
use pubsub_service::inbound::http::health::HealthState;
use pubsub_service::inbound::http::service_api::ServiceApi;
use pubsub_service::inbound::http::state::HttpState;
use pubsub_service::outbound::network::{LoopbackReceiver, loopback};

use super::ServerConfig;

/// Registry plus the receiving end of its network, ready to be started.
pub(super) struct PubsubStack {
    pub(super) registry: Arc<TopicRegistry>,
    pub(super) receiver: LoopbackReceiver,
}

impl PubsubStack {
    /// Handler bound to the router.
    pub(super) fn api(&self) -> Arc<dyn PubsubApi> {
        Arc::new(ServiceApi::new(HttpState::from_registry(self.registry.clone())))
    }
}

/// Build the registry over a loopback network identified by the configured
/// peer id.
pub(super) fn build_pubsub_stack(config: &ServerConfig) -> PubsubStack {
    let (network, receiver) = loopback(config.peer_id.clone(), config.delivery_buffer);
    info!(peer_id = %network.local_peer(), "loopback network ready");
    let registry = Arc::new(TopicRegistry::new(
        Arc::new(network),
        Arc::new(DefaultClock),
        config.limits,
    ));
    PubsubStack { registry, receiver }
}

/// Handles to the delivery pump and the expiry sweeper.
#[cfg_attr(
    not(test),
    expect(dead_code, reason = "handles are only awaited or aborted by tests")
)]
pub(super) struct BackgroundTasks {
    pub(super) delivery: JoinHandle<()>,
    pub(super) sweeper: JoinHandle<()>,
}

/// Start the delivery pump and the expiry sweeper on the current runtime.
///
/// The pump only stops once the network is gone, after which no message can
/// reach a subscriber, so the service reports itself unhealthy.
pub(super) fn spawn_background_tasks(
    stack: PubsubStack,
    config: &ServerConfig,
    health_state: web::Data<HealthState>,
) -> BackgroundTasks {
    let PubsubStack { registry, receiver } = stack;
    let sink: Arc<dyn InboundMessageSink> = registry.clone();
    let delivery = tokio::spawn(async move {
        let delivered = receiver.run(sink).await;
        error!(delivered, "message delivery stopped");
        health_state.mark_unhealthy();
    });
    let sweeper = ExpirySweeper::new(registry, config.sweep_interval).spawn();
    BackgroundTasks { delivery, sweeper }
}
