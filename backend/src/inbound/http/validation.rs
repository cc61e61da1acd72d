//! Conversions from raw parameter values to validated domain values.
//!
//! Failures become `invalid_request` errors naming the offending field.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::domain::{Error, PeerId, TopicName};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid(field: FieldName, reason: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("invalid {}: {reason}", field.as_str()))
}

pub(crate) fn parse_topic(field: FieldName, raw: String) -> Result<TopicName, Error> {
    TopicName::new(raw).map_err(|err| invalid(field, err))
}

pub(crate) fn parse_peer_id(field: FieldName, raw: String) -> Result<PeerId, Error> {
    PeerId::new(raw).map_err(|err| invalid(field, err))
}

/// Decode a standard (padded) base64 payload.
pub(crate) fn decode_base64(field: FieldName, raw: &str) -> Result<Vec<u8>, Error> {
    STANDARD.decode(raw).map_err(|err| invalid(field, err))
}

/// Drop empty filter strings so `?filter-prefix=` behaves like an absent one.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    const TOPIC: FieldName = FieldName::new("topic");

    #[rstest]
    fn topic_errors_name_the_field() {
        let err = parse_topic(TOPIC, String::new()).expect_err("empty topic");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "invalid topic: topic name must not be empty");
    }

    #[rstest]
    fn peer_ids_are_validated() {
        assert!(parse_peer_id(FieldName::new("peerid"), "Qm/..".to_owned()).is_err());
        assert!(parse_peer_id(FieldName::new("peerid"), "QmValid123".to_owned()).is_ok());
    }

    #[rstest]
    #[case("aGVsbG8=", Some(b"hello".to_vec()))]
    #[case("", Some(Vec::new()))]
    #[case("not base64!", None)]
    fn base64_payloads_are_decoded(#[case] raw: &str, #[case] expected: Option<Vec<u8>>) {
        assert_eq!(decode_base64(FieldName::new("data"), raw).ok(), expected);
    }

    #[rstest]
    fn empty_filters_are_dropped() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("a".to_owned())), Some("a".to_owned()));
    }
}
