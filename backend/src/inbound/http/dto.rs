//! JSON bodies exchanged by the topics endpoints.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    PubsubMessage, QueuePolicy, ReadBatch, ServiceLimits, SubscriptionConfig, TopicBatch,
    TopicSummary,
};
use crate::inbound::http::params::QueuePolicyParam;

/// Request body of `POST /publish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublishMessageProperty {
    /// Base64-encoded payload.
    #[schema(example = "aGVsbG8=")]
    pub data: String,
}

/// Effective subscription configuration returned by `POST /join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub struct JoinResponse {
    pub queue_length: u32,
    pub queue_policy: QueuePolicyParam,
    /// Inactivity timeout in seconds.
    pub timeout: u32,
    pub max_message_size: u32,
}

impl From<SubscriptionConfig> for JoinResponse {
    fn from(value: SubscriptionConfig) -> Self {
        Self {
            queue_length: value.queue_length(),
            queue_policy: value.queue_policy().into(),
            timeout: value.timeout(),
            max_message_size: value.max_message_size(),
        }
    }
}

/// One subscribed topic as returned by `GET /list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub struct ListResponseInner {
    pub topic: String,
    pub queue_length: u32,
    pub queue_policy: QueuePolicyParam,
    pub timeout: u32,
    pub max_message_size: u32,
}

impl From<TopicSummary> for ListResponseInner {
    fn from(value: TopicSummary) -> Self {
        let JoinResponse {
            queue_length,
            queue_policy,
            timeout,
            max_message_size,
        } = value.config.into();
        Self {
            topic: value.topic.into(),
            queue_length,
            queue_policy,
            timeout,
            max_message_size,
        }
    }
}

/// Limits returned by `GET /discovery`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveryResponse {
    pub max_queue_length: u32,
    /// Longest accepted inactivity timeout in seconds.
    pub max_timeout: u32,
    pub max_message_size: u32,
    pub max_topics: u32,
    pub queue_policies: Vec<QueuePolicyParam>,
}

impl From<ServiceLimits> for DiscoveryResponse {
    fn from(value: ServiceLimits) -> Self {
        Self {
            max_queue_length: value.max_queue_length(),
            max_timeout: value.max_timeout(),
            max_message_size: value.max_message_size(),
            max_topics: value.max_topics(),
            queue_policies: QueuePolicy::ALL.into_iter().map(Into::into).collect(),
        }
    }
}

/// A received message. Binary fields are base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReadMessageProperty {
    /// Originating peer.
    pub from: String,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seqno: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl From<PubsubMessage> for ReadMessageProperty {
    fn from(value: PubsubMessage) -> Self {
        Self {
            from: value.from.into(),
            data: STANDARD.encode(value.data),
            seqno: value.seqno,
            signature: value.signature.map(|bytes| STANDARD.encode(bytes)),
            key: value.key.map(|bytes| STANDARD.encode(bytes)),
        }
    }
}

fn encode_messages(messages: Vec<PubsubMessage>) -> Vec<ReadMessageProperty> {
    messages.into_iter().map(Into::into).collect()
}

/// Body of `POST /read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub struct ReadResponse {
    /// Messages lost to queue capacity since the previous read.
    pub messages_dropped: u64,
    pub messages_remaining: u64,
    pub messages: Vec<ReadMessageProperty>,
    /// Base64 public keys of the returned messages, keyed by peer id.
    /// Omitted when no message carries a key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubkeys: Option<BTreeMap<String, String>>,
}

fn collect_pubkeys(messages: &[PubsubMessage]) -> Option<BTreeMap<String, String>> {
    let keys: BTreeMap<String, String> = messages
        .iter()
        .filter_map(|message| {
            message
                .key
                .as_ref()
                .map(|key| (message.from.as_str().to_owned(), STANDARD.encode(key)))
        })
        .collect();
    (!keys.is_empty()).then_some(keys)
}

impl From<ReadBatch> for ReadResponse {
    fn from(value: ReadBatch) -> Self {
        let pubkeys = collect_pubkeys(&value.messages);
        Self {
            messages_dropped: value.messages_dropped,
            messages_remaining: value.messages_remaining,
            messages: encode_messages(value.messages),
            pubkeys,
        }
    }
}

/// One topic of the `POST /read-all` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub struct ReadAllResponseInner {
    pub topic: String,
    pub messages_dropped: u64,
    pub messages_remaining: u64,
    pub messages: Vec<ReadMessageProperty>,
}

impl From<TopicBatch> for ReadAllResponseInner {
    fn from(value: TopicBatch) -> Self {
        Self {
            topic: value.topic.into(),
            messages_dropped: value.batch.messages_dropped,
            messages_remaining: value.batch.messages_remaining,
            messages: encode_messages(value.batch.messages),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Wire-shape coverage for response bodies.

    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{PeerId, SubscriptionRequest, TopicName};

    #[rstest]
    fn join_response_uses_kebab_case() {
        let config = ServiceLimits::default()
            .resolve(&SubscriptionRequest::default())
            .expect("defaults resolve");
        let value = serde_json::to_value(JoinResponse::from(config)).expect("serialise");
        assert_eq!(
            value,
            json!({
                "queue-length": 20,
                "queue-policy": "drop-old",
                "timeout": 600,
                "max-message-size": 1_048_576,
            })
        );
    }

    #[rstest]
    fn discovery_lists_every_policy() {
        let value = serde_json::to_value(DiscoveryResponse::from(ServiceLimits::default()))
            .expect("serialise");
        assert_eq!(value["queue-policies"], json!(["drop-old", "drop-new"]));
        assert_eq!(value["max-topics"], json!(256));
    }

    #[rstest]
    fn read_message_encodes_binary_fields_and_omits_absent_ones() {
        let message = PubsubMessage {
            from: PeerId::new("QmA").expect("valid peer id"),
            data: b"hello".to_vec(),
            seqno: None,
            signature: None,
            key: None,
        };
        let value = serde_json::to_value(ReadMessageProperty::from(message)).expect("serialise");
        assert_eq!(value, json!({ "from": "QmA", "data": "aGVsbG8=" }));
    }

    #[rstest]
    fn read_response_maps_message_keys_by_peer() {
        let signed = |from: &str, key: Option<&[u8]>| PubsubMessage {
            from: PeerId::new(from).expect("valid peer id"),
            data: b"x".to_vec(),
            seqno: Some(1),
            signature: Some(b"sig".to_vec()),
            key: key.map(<[u8]>::to_vec),
        };
        let batch = ReadBatch {
            messages_dropped: 0,
            messages_remaining: 0,
            messages: vec![signed("QmA", Some(b"ka")), signed("QmB", None)],
        };

        let value = serde_json::to_value(ReadResponse::from(batch)).expect("serialise");

        assert_eq!(value["pubkeys"], json!({ "QmA": STANDARD.encode("ka") }));
        assert_eq!(value["messages"][0]["key"], json!(STANDARD.encode("ka")));
    }

    #[rstest]
    fn read_response_omits_pubkeys_without_keys() {
        let batch = ReadBatch {
            messages_dropped: 0,
            messages_remaining: 0,
            messages: Vec::new(),
        };
        let value = serde_json::to_value(ReadResponse::from(batch)).expect("serialise");
        assert!(value.get("pubkeys").is_none());
    }

    #[rstest]
    fn read_all_flattens_the_batch() {
        let batch = TopicBatch {
            topic: TopicName::new("chat").expect("valid topic"),
            batch: ReadBatch {
                messages_dropped: 2,
                messages_remaining: 1,
                messages: Vec::new(),
            },
        };
        let value = serde_json::to_value(ReadAllResponseInner::from(batch)).expect("serialise");
        assert_eq!(
            value,
            json!({
                "topic": "chat",
                "messages-dropped": 2,
                "messages-remaining": 1,
                "messages": [],
            })
        );
    }
}
