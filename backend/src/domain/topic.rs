//! Pubsub topic names and topic selection filters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a topic name in bytes.
pub const TOPIC_NAME_MAX_LEN: usize = 256;

/// Validation errors returned by [`TopicName::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopicNameValidationError {
    /// The name was empty.
    #[error("topic name must not be empty")]
    Empty,
    /// The name exceeded [`TOPIC_NAME_MAX_LEN`].
    #[error("topic name must be at most {max} bytes")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The name contained a control character.
    #[error("topic name must not contain control characters")]
    ControlCharacter,
}

/// Name of a pubsub topic.
///
/// Ordering is lexicographic on the raw name, which is the order used by
/// listing and multi-topic reads.
///
/// # Examples
/// ```
/// use pubsub_service::domain::TopicName;
///
/// let topic = TopicName::new("blocks/mainnet").expect("valid topic");
/// assert_eq!(topic.as_str(), "blocks/mainnet");
/// assert!(TopicName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicName(String);

impl TopicName {
    /// Validate and construct a topic name.
    pub fn new(name: impl Into<String>) -> Result<Self, TopicNameValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TopicNameValidationError::Empty);
        }
        if name.len() > TOPIC_NAME_MAX_LEN {
            return Err(TopicNameValidationError::TooLong {
                max: TOPIC_NAME_MAX_LEN,
            });
        }
        if name.chars().any(char::is_control) {
            return Err(TopicNameValidationError::ControlCharacter);
        }
        Ok(Self(name))
    }

    /// Borrow the raw name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for TopicName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TopicName> for String {
    fn from(value: TopicName) -> Self {
        value.0
    }
}

impl TryFrom<String> for TopicName {
    type Error = TopicNameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Prefix/suffix selection over topic names. Empty filters match everything.
///
/// # Examples
/// ```
/// use pubsub_service::domain::{TopicFilter, TopicName};
///
/// let filter = TopicFilter::new(Some("chat/".into()), Some("/en".into()));
/// let topic = TopicName::new("chat/general/en").expect("valid topic");
/// assert!(filter.matches(&topic));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter {
    prefix: Option<String>,
    suffix: Option<String>,
}

impl TopicFilter {
    /// Build a filter from optional prefix and suffix constraints.
    pub fn new(prefix: Option<String>, suffix: Option<String>) -> Self {
        Self { prefix, suffix }
    }

    /// Whether `topic` satisfies both constraints.
    pub fn matches(&self, topic: &TopicName) -> bool {
        let name = topic.as_str();
        self.prefix
            .as_deref()
            .is_none_or(|prefix| name.starts_with(prefix))
            && self
                .suffix
                .as_deref()
                .is_none_or(|suffix| name.ends_with(suffix))
    }
}
