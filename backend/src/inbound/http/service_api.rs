//! Production [`PubsubApi`] backed by the domain ports.
//!
//! Validates decoded parameters into domain values, calls the ports held in
//! [`HttpState`], and renders the JSON bodies in [`dto`](super::dto).

use actix_web::HttpResponse;
use async_trait::async_trait;

use crate::domain::ports::ListTopicsRequest;
use crate::domain::{ReadOptions, SubscriptionRequest, TopicFilter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::api::PubsubApi;
use crate::inbound::http::dto::{
    DiscoveryResponse, JoinResponse, ListResponseInner, PublishMessageProperty,
    ReadAllResponseInner, ReadResponse,
};
use crate::inbound::http::params::{
    FilterPeerIdParams, JoinParams, LeaveParams, ListParams, PublishParams, ReadAllParams,
    ReadParams,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, decode_base64, non_empty, parse_peer_id, parse_topic,
};

const TOPIC: FieldName = FieldName::new("topic");
const PEER_ID: FieldName = FieldName::new("peerid");
const DATA: FieldName = FieldName::new("data");

/// Handler serving the topics API from domain ports.
#[derive(Clone)]
pub struct ServiceApi {
    state: HttpState,
}

impl ServiceApi {
    pub fn new(state: HttpState) -> Self {
        Self { state }
    }
}

#[async_trait(?Send)]
impl PubsubApi for ServiceApi {
    async fn join(&self, params: JoinParams) -> ApiResult<HttpResponse> {
        let topic = parse_topic(TOPIC, params.topic)?;
        let request = SubscriptionRequest {
            queue_length: params.queue_length,
            queue_policy: params.queue_policy.map(Into::into),
            timeout: params.timeout,
            max_message_size: params.max_message_size,
        };
        let config = self.state.subscriptions.join(topic, request).await?;
        Ok(HttpResponse::Accepted().json(JoinResponse::from(config)))
    }

    async fn leave(&self, params: LeaveParams) -> ApiResult<HttpResponse> {
        let topic = parse_topic(TOPIC, params.topic)?;
        self.state.subscriptions.leave(&topic).await?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn list(&self, params: ListParams) -> ApiResult<HttpResponse> {
        let request = ListTopicsRequest {
            filter: TopicFilter::new(
                non_empty(params.filter_prefix),
                non_empty(params.filter_suffix),
            ),
            after: non_empty(params.after_topic),
            max_topics: params.max_topic,
        };
        let topics = self.state.topics.list(request).await?;
        let body: Vec<ListResponseInner> = topics.into_iter().map(Into::into).collect();
        Ok(HttpResponse::Ok().json(body))
    }

    async fn publish(
        &self,
        params: PublishParams,
        body: PublishMessageProperty,
    ) -> ApiResult<HttpResponse> {
        let topic = parse_topic(TOPIC, params.topic)?;
        let data = decode_base64(DATA, &body.data)?;
        self.state.messages.publish(&topic, data).await?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn read(&self, params: ReadParams) -> ApiResult<HttpResponse> {
        let topic = parse_topic(TOPIC, params.topic)?;
        let options = ReadOptions {
            max_messages: params.max_messages,
            include_signature: params.include_signature.unwrap_or(false),
        };
        let batch = self.state.messages.read(&topic, options).await?;
        Ok(HttpResponse::Ok().json(ReadResponse::from(batch)))
    }

    async fn read_all(&self, params: ReadAllParams) -> ApiResult<HttpResponse> {
        let filter = TopicFilter::new(
            non_empty(params.filter_prefix),
            non_empty(params.filter_suffix),
        );
        let options = ReadOptions {
            max_messages: params.max_messages,
            include_signature: params.include_signature.unwrap_or(false),
        };
        let batches = self.state.messages.read_all(filter, options).await?;
        let body: Vec<ReadAllResponseInner> = batches.into_iter().map(Into::into).collect();
        Ok(HttpResponse::Ok().json(body))
    }

    async fn discovery(&self) -> ApiResult<HttpResponse> {
        let limits = self.state.topics.discovery().await?;
        Ok(HttpResponse::Ok().json(DiscoveryResponse::from(limits)))
    }

    async fn filter_peer_id(&self, params: FilterPeerIdParams) -> ApiResult<HttpResponse> {
        let topic = parse_topic(TOPIC, params.topic)?;
        let peer = parse_peer_id(PEER_ID, params.peerid)?;
        self.state.subscriptions.filter_peer(&topic, peer).await?;
        Ok(HttpResponse::Accepted().finish())
    }
}
