//! Router binding every topics operation to its method and path.
//!
//! [`routes`] returns an actix [`Scope`] that decodes each request's query
//! string into the operation's parameter record and dispatches to the
//! [`PubsubApi`] it was given. Decoding failures are answered here with a
//! `400` failure envelope; the handler is not invoked.

use std::sync::Arc;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, Scope, get, post, web};
use tracing::debug;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::api::PubsubApi;
use crate::inbound::http::dto::{
    DiscoveryResponse, JoinResponse, ListResponseInner, PublishMessageProperty,
    ReadAllResponseInner, ReadResponse,
};
use crate::inbound::http::error::Failure;
use crate::inbound::http::params::{
    FilterPeerIdParams, JoinParams, LeaveParams, ListParams, PublishParams, ReadAllParams,
    ReadParams,
};

/// Largest accepted `POST /publish` body. Base64 inflates payloads by a third,
/// so this leaves room for the default 1 MiB message limit.
pub const PUBLISH_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Build the topics scope mounted at `base_path`.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use pubsub_service::inbound::http::echo::EchoJoinApi;
/// use pubsub_service::inbound::http::router::routes;
///
/// let _app = App::new().service(routes("/v1", Arc::new(EchoJoinApi)));
/// ```
pub fn routes(base_path: &str, api: Arc<dyn PubsubApi>) -> Scope {
    web::scope(base_path)
        .app_data(web::Data::from(api))
        .app_data(query_config())
        .app_data(json_config())
        .service(discovery)
        .service(filter_peer_id)
        .service(join)
        .service(leave)
        .service(list)
        .service(publish)
        .service(read)
        .service(read_all)
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, req: &HttpRequest| {
        debug!(path = %req.path(), error = %err, "rejected query string");
        Error::invalid_request(format!("invalid query: {err}")).into()
    })
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(PUBLISH_BODY_LIMIT)
        .error_handler(|err: JsonPayloadError, req: &HttpRequest| {
            debug!(path = %req.path(), error = %err, "rejected request body");
            match err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    Error::payload_too_large(format!("request body: {err}")).into()
                }
                other => Error::invalid_request(format!("invalid body: {other}")).into(),
            }
        })
}

/// Report the limits clients may request when joining.
#[utoipa::path(
    get,
    path = "/v1/discovery",
    responses(
        (status = 200, description = "Service limits", body = DiscoveryResponse),
        (status = 500, description = "Internal server error", body = Failure)
    ),
    tags = ["topics"],
    operation_id = "discovery"
)]
#[get("/discovery")]
pub async fn discovery(api: web::Data<dyn PubsubApi>) -> ApiResult<HttpResponse> {
    api.discovery().await
}

/// Drop messages from a peer on a subscribed topic.
#[utoipa::path(
    post,
    path = "/v1/filter-peerid",
    params(FilterPeerIdParams),
    responses(
        (status = 202, description = "Peer filtered"),
        (status = 400, description = "Invalid topic or peer id", body = Failure),
        (status = 404, description = "Topic not subscribed", body = Failure)
    ),
    tags = ["topics"],
    operation_id = "filterPeerId"
)]
#[post("/filter-peerid")]
pub async fn filter_peer_id(
    api: web::Data<dyn PubsubApi>,
    params: web::Query<FilterPeerIdParams>,
) -> ApiResult<HttpResponse> {
    api.filter_peer_id(params.into_inner()).await
}

/// Subscribe to a topic or refresh an existing subscription.
#[utoipa::path(
    post,
    path = "/v1/join",
    params(JoinParams),
    responses(
        (status = 202, description = "Subscribed; effective configuration", body = JoinResponse),
        (status = 400, description = "Invalid parameters", body = Failure),
        (status = 402, description = "Subscription quota exceeded", body = Failure),
        (status = 503, description = "Pubsub network unavailable", body = Failure)
    ),
    tags = ["topics"],
    operation_id = "join"
)]
#[post("/join")]
pub async fn join(
    api: web::Data<dyn PubsubApi>,
    params: web::Query<JoinParams>,
) -> ApiResult<HttpResponse> {
    api.join(params.into_inner()).await
}

/// Unsubscribe from a topic and discard its queued messages.
#[utoipa::path(
    post,
    path = "/v1/leave",
    params(LeaveParams),
    responses(
        (status = 200, description = "Unsubscribed"),
        (status = 400, description = "Invalid topic", body = Failure),
        (status = 404, description = "Topic not subscribed", body = Failure)
    ),
    tags = ["topics"],
    operation_id = "leave"
)]
#[post("/leave")]
pub async fn leave(
    api: web::Data<dyn PubsubApi>,
    params: web::Query<LeaveParams>,
) -> ApiResult<HttpResponse> {
    api.leave(params.into_inner()).await
}

/// List subscribed topics in name order.
#[utoipa::path(
    get,
    path = "/v1/list",
    params(ListParams),
    responses(
        (status = 200, description = "Subscribed topics", body = [ListResponseInner]),
        (status = 400, description = "Invalid parameters", body = Failure)
    ),
    tags = ["topics"],
    operation_id = "list"
)]
#[get("/list")]
pub async fn list(
    api: web::Data<dyn PubsubApi>,
    params: web::Query<ListParams>,
) -> ApiResult<HttpResponse> {
    api.list(params.into_inner()).await
}

/// Publish a base64-encoded message on a subscribed topic.
#[utoipa::path(
    post,
    path = "/v1/publish",
    params(PublishParams),
    request_body = PublishMessageProperty,
    responses(
        (status = 200, description = "Published"),
        (status = 400, description = "Invalid topic or payload", body = Failure),
        (status = 404, description = "Topic not subscribed", body = Failure),
        (status = 413, description = "Message too large", body = Failure),
        (status = 503, description = "Pubsub network unavailable", body = Failure)
    ),
    tags = ["topics"],
    operation_id = "publish"
)]
#[post("/publish")]
pub async fn publish(
    api: web::Data<dyn PubsubApi>,
    params: web::Query<PublishParams>,
    body: web::Json<PublishMessageProperty>,
) -> ApiResult<HttpResponse> {
    api.publish(params.into_inner(), body.into_inner()).await
}

/// Consume queued messages from one topic.
#[utoipa::path(
    post,
    path = "/v1/read",
    params(ReadParams),
    responses(
        (status = 200, description = "Consumed messages", body = ReadResponse),
        (status = 400, description = "Invalid parameters", body = Failure),
        (status = 404, description = "Topic not subscribed", body = Failure)
    ),
    tags = ["topics"],
    operation_id = "read"
)]
#[post("/read")]
pub async fn read(
    api: web::Data<dyn PubsubApi>,
    params: web::Query<ReadParams>,
) -> ApiResult<HttpResponse> {
    api.read(params.into_inner()).await
}

/// Consume queued messages from every matching topic.
#[utoipa::path(
    post,
    path = "/v1/read-all",
    params(ReadAllParams),
    responses(
        (status = 200, description = "Consumed messages per topic", body = [ReadAllResponseInner]),
        (status = 400, description = "Invalid parameters", body = Failure)
    ),
    tags = ["topics"],
    operation_id = "readAll"
)]
#[post("/read-all")]
pub async fn read_all(
    api: web::Data<dyn PubsubApi>,
    params: web::Query<ReadAllParams>,
) -> ApiResult<HttpResponse> {
    api.read_all(params.into_inner()).await
}
