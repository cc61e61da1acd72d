//! Minimal [`PubsubApi`] used to exercise the router.
//!
//! `join` answers `200 text/plain` with `Joined topic: {topic}`; every other
//! operation answers `200` with an empty body. Nothing ever fails.

use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use async_trait::async_trait;

use crate::inbound::http::ApiResult;
use crate::inbound::http::api::PubsubApi;
use crate::inbound::http::dto::PublishMessageProperty;
use crate::inbound::http::params::{
    FilterPeerIdParams, JoinParams, LeaveParams, ListParams, PublishParams, ReadAllParams,
    ReadParams,
};

/// Stateless handler that echoes joins and ignores everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoJoinApi;

impl EchoJoinApi {
    fn empty() -> ApiResult<HttpResponse> {
        Ok(HttpResponse::Ok().finish())
    }
}

#[async_trait(?Send)]
impl PubsubApi for EchoJoinApi {
    async fn join(&self, params: JoinParams) -> ApiResult<HttpResponse> {
        Ok(HttpResponse::Ok()
            .content_type(ContentType::plaintext())
            .body(format!("Joined topic: {}", params.topic)))
    }

    async fn leave(&self, _params: LeaveParams) -> ApiResult<HttpResponse> {
        Self::empty()
    }

    async fn list(&self, _params: ListParams) -> ApiResult<HttpResponse> {
        Self::empty()
    }

    async fn publish(
        &self,
        _params: PublishParams,
        _body: PublishMessageProperty,
    ) -> ApiResult<HttpResponse> {
        Self::empty()
    }

    async fn read(&self, _params: ReadParams) -> ApiResult<HttpResponse> {
        Self::empty()
    }

    async fn read_all(&self, _params: ReadAllParams) -> ApiResult<HttpResponse> {
        Self::empty()
    }

    async fn discovery(&self) -> ApiResult<HttpResponse> {
        Self::empty()
    }

    async fn filter_peer_id(&self, _params: FilterPeerIdParams) -> ApiResult<HttpResponse> {
        Self::empty()
    }
}
