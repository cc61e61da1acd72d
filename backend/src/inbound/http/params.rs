//! Query parameter records decoded by the router.
//!
//! Every record is the raw, per-request decoding of one operation's query
//! string. Keys are kebab-case on the wire. Fields are not validated beyond
//! their type here; handlers turn them into domain values.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::QueuePolicy;

/// Queue overflow policy as accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QueuePolicyParam {
    /// Evict the oldest queued message.
    DropOld,
    /// Discard the incoming message.
    DropNew,
}

impl From<QueuePolicyParam> for QueuePolicy {
    fn from(value: QueuePolicyParam) -> Self {
        match value {
            QueuePolicyParam::DropOld => Self::DropOld,
            QueuePolicyParam::DropNew => Self::DropNew,
        }
    }
}

impl From<QueuePolicy> for QueuePolicyParam {
    fn from(value: QueuePolicy) -> Self {
        match value {
            QueuePolicy::DropOld => Self::DropOld,
            QueuePolicy::DropNew => Self::DropNew,
        }
    }
}

/// Parameters of `POST /join`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, IntoParams)]
#[serde(rename_all = "kebab-case")]
#[into_params(parameter_in = Query)]
pub struct JoinParams {
    /// Topic to subscribe to.
    pub topic: String,
    /// Requested queue capacity; clamped to the service maximum.
    pub queue_length: Option<u32>,
    /// Behaviour when the queue is full.
    #[param(inline)]
    pub queue_policy: Option<QueuePolicyParam>,
    /// Inactivity timeout in seconds; clamped to the service maximum.
    pub timeout: Option<u32>,
    /// Largest accepted payload in bytes.
    pub max_message_size: Option<u32>,
}

/// Parameters of `POST /leave`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveParams {
    /// Topic to unsubscribe from.
    pub topic: String,
}

/// Parameters of `GET /list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[serde(rename_all = "kebab-case")]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Only topics starting with this prefix.
    pub filter_prefix: Option<String>,
    /// Only topics ending with this suffix.
    pub filter_suffix: Option<String>,
    /// Maximum number of topics returned.
    pub max_topic: Option<u32>,
    /// Only topics sorting strictly after this name.
    pub after_topic: Option<String>,
}

/// Parameters of `POST /publish`. The payload travels in the JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublishParams {
    /// Topic to publish on.
    pub topic: String,
}

/// Parameters of `POST /read`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, IntoParams)]
#[serde(rename_all = "kebab-case")]
#[into_params(parameter_in = Query)]
pub struct ReadParams {
    /// Topic to consume from.
    pub topic: String,
    /// Maximum number of messages returned.
    pub max_messages: Option<u32>,
    /// Include `seqno`, `signature` and `key` on each message.
    pub include_signature: Option<bool>,
}

/// Parameters of `POST /read-all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[serde(rename_all = "kebab-case")]
#[into_params(parameter_in = Query)]
pub struct ReadAllParams {
    /// Maximum number of messages returned across all topics.
    pub max_messages: Option<u32>,
    /// Only topics starting with this prefix.
    pub filter_prefix: Option<String>,
    /// Only topics ending with this suffix.
    pub filter_suffix: Option<String>,
    /// Include `seqno`, `signature` and `key` on each message.
    pub include_signature: Option<bool>,
}

/// Parameters of `POST /filter-peerid`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterPeerIdParams {
    /// Topic the filter applies to.
    pub topic: String,
    /// Peer whose messages are dropped.
    pub peerid: String,
}

#[cfg(test)]
mod tests {
    //! Query decoding coverage for the parameter records.

    use actix_web::web::Query;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn join_params_decode_kebab_case_keys() {
        let Query(params) = Query::<JoinParams>::from_query(
            "topic=chat&queue-length=5&queue-policy=drop-new&timeout=30&max-message-size=64",
        )
        .expect("valid query");
        assert_eq!(
            params,
            JoinParams {
                topic: "chat".to_owned(),
                queue_length: Some(5),
                queue_policy: Some(QueuePolicyParam::DropNew),
                timeout: Some(30),
                max_message_size: Some(64),
            }
        );
    }

    #[rstest]
    fn join_params_require_topic() {
        assert!(Query::<JoinParams>::from_query("queue-length=5").is_err());
    }

    #[rstest]
    #[case("topic=chat&queue-policy=drop-everything")]
    #[case("topic=chat&queue-length=-1")]
    #[case("topic=chat&timeout=soon")]
    fn join_params_reject_malformed_values(#[case] query: &str) {
        assert!(Query::<JoinParams>::from_query(query).is_err());
    }

    #[rstest]
    fn topic_is_percent_decoded() {
        let Query(params) =
            Query::<LeaveParams>::from_query("topic=news%2Feu%20%26%20more").expect("valid query");
        assert_eq!(params.topic, "news/eu & more");
    }

    #[rstest]
    fn read_params_decode_booleans() {
        let Query(params) =
            Query::<ReadParams>::from_query("topic=chat&max-messages=3&include-signature=true")
                .expect("valid query");
        assert_eq!(params.max_messages, Some(3));
        assert_eq!(params.include_signature, Some(true));
    }

    #[rstest]
    fn list_and_read_all_params_are_optional() {
        let Query(list) = Query::<ListParams>::from_query("").expect("empty query");
        assert_eq!(list, ListParams::default());
        let Query(read_all) = Query::<ReadAllParams>::from_query("").expect("empty query");
        assert_eq!(read_all, ReadAllParams::default());
    }

    #[rstest]
    fn filter_peer_id_params_need_both_fields() {
        assert!(Query::<FilterPeerIdParams>::from_query("topic=chat").is_err());
        let Query(params) =
            Query::<FilterPeerIdParams>::from_query("topic=chat&peerid=QmA").expect("valid query");
        assert_eq!(params.peerid, "QmA");
    }

    #[rstest]
    fn queue_policy_converts_both_ways() {
        for policy in QueuePolicy::ALL {
            assert_eq!(QueuePolicy::from(QueuePolicyParam::from(policy)), policy);
        }
    }
}
