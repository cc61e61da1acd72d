//! Peer identities as carried by pubsub messages.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a peer identity in bytes.
pub const PEER_ID_MAX_LEN: usize = 128;

/// Validation errors returned by [`PeerId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeerIdValidationError {
    /// The identity was empty.
    #[error("peer id must not be empty")]
    Empty,
    /// The identity exceeded [`PEER_ID_MAX_LEN`].
    #[error("peer id must be at most {max} characters")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The identity was not plain ASCII alphanumeric text.
    #[error("peer id may only contain ASCII letters and digits")]
    InvalidCharacters,
}

/// Textual peer identity (base58 or base32 multihash in practice).
///
/// # Examples
/// ```
/// use pubsub_service::domain::PeerId;
///
/// let peer = PeerId::new("QmdXGaeGiVA745XorV1jr11RHxB9z4fqykm6xCUPX1aTJo").expect("valid");
/// assert!(PeerId::new("not a peer").is_err());
/// # let _ = peer;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerId(String);

impl PeerId {
    /// Validate and construct a peer identity.
    pub fn new(id: impl Into<String>) -> Result<Self, PeerIdValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(PeerIdValidationError::Empty);
        }
        if id.len() > PEER_ID_MAX_LEN {
            return Err(PeerIdValidationError::TooLong {
                max: PEER_ID_MAX_LEN,
            });
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PeerIdValidationError::InvalidCharacters);
        }
        Ok(Self(id))
    }

    /// Generate a random identity for a node that was not given one.
    pub fn random() -> Self {
        Self(format!("Qm{}", Uuid::new_v4().simple()))
    }

    /// Borrow the raw identity.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PeerId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PeerId> for String {
    fn from(value: PeerId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PeerId {
    type Error = PeerIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
