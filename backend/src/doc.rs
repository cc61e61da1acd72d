//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every topics operation from the inbound router, the
//! health probes and the JSON bodies they exchange. The document is served by
//! Swagger UI in debug builds and exported via `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::inbound::http::dto::{
    DiscoveryResponse, JoinResponse, ListResponseInner, PublishMessageProperty,
    ReadAllResponseInner, ReadMessageProperty, ReadResponse,
};
use crate::inbound::http::error::{Failure, FailureError};
use crate::inbound::http::health::{ProbeBody, ProbeStatus};
use crate::inbound::http::params::QueuePolicyParam;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pubsub service API",
        description = "Join pubsub topics, publish to them and read queued messages over HTTP.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::router::discovery,
        crate::inbound::http::router::filter_peer_id,
        crate::inbound::http::router::join,
        crate::inbound::http::router::leave,
        crate::inbound::http::router::list,
        crate::inbound::http::router::publish,
        crate::inbound::http::router::read,
        crate::inbound::http::router::read_all,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        DiscoveryResponse,
        JoinResponse,
        ListResponseInner,
        PublishMessageProperty,
        ReadAllResponseInner,
        ReadMessageProperty,
        ReadResponse,
        QueuePolicyParam,
        Failure,
        FailureError,
        ProbeBody,
        ProbeStatus,
    )),
    tags(
        (name = "topics", description = "Topic subscriptions and message queues"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
