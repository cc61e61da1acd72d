//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **network**: pubsub network adapters (in-process loopback)
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod network;
