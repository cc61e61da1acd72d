//! Handler contract invoked by the router.
//!
//! The router owns URL-to-operation dispatch and query decoding; an
//! implementation of [`PubsubApi`] owns everything else. Each method receives
//! the decoded parameter record for its operation and returns the complete
//! HTTP response, so implementations choose status, headers and body.

use actix_web::HttpResponse;
use async_trait::async_trait;

use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::PublishMessageProperty;
use crate::inbound::http::params::{
    FilterPeerIdParams, JoinParams, LeaveParams, ListParams, PublishParams, ReadAllParams,
    ReadParams,
};

/// One method per topics operation.
///
/// Futures are not required to be `Send`: actix runs each request on the
/// worker thread that accepted it.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use pubsub_service::inbound::http::api::PubsubApi;
/// use pubsub_service::inbound::http::echo::EchoJoinApi;
/// use pubsub_service::inbound::http::router::routes;
///
/// let api: Arc<dyn PubsubApi> = Arc::new(EchoJoinApi);
/// let _scope = routes("/v1", api);
/// ```
#[async_trait(?Send)]
pub trait PubsubApi: Send + Sync {
    /// `POST /join`
    async fn join(&self, params: JoinParams) -> ApiResult<HttpResponse>;

    /// `POST /leave`
    async fn leave(&self, params: LeaveParams) -> ApiResult<HttpResponse>;

    /// `GET /list`
    async fn list(&self, params: ListParams) -> ApiResult<HttpResponse>;

    /// `POST /publish`
    async fn publish(
        &self,
        params: PublishParams,
        body: PublishMessageProperty,
    ) -> ApiResult<HttpResponse>;

    /// `POST /read`
    async fn read(&self, params: ReadParams) -> ApiResult<HttpResponse>;

    /// `POST /read-all`
    async fn read_all(&self, params: ReadAllParams) -> ApiResult<HttpResponse>;

    /// `GET /discovery`
    async fn discovery(&self) -> ApiResult<HttpResponse>;

    /// `POST /filter-peerid`
    async fn filter_peer_id(&self, params: FilterPeerIdParams) -> ApiResult<HttpResponse>;
}
