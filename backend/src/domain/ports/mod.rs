//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`SubscriptionCommand`, `MessageCommand`, `TopicQuery`,
//! `SubscriptionMaintenance`) are called by inbound adapters and background
//! tasks. `PubsubNetwork` is the driven port towards the network, and
//! `InboundMessageSink` is how the network hands messages back.

mod macros;
pub(crate) use macros::define_port_error;

mod inbound_message_sink;
mod message_command;
mod pubsub_network;
mod subscription_command;
mod subscription_maintenance;
mod topic_query;

pub use inbound_message_sink::InboundMessageSink;
#[cfg(test)]
pub use inbound_message_sink::MockInboundMessageSink;
#[cfg(test)]
pub use message_command::MockMessageCommand;
pub use message_command::{FixtureMessageCommand, MessageCommand};
#[cfg(test)]
pub use pubsub_network::MockPubsubNetwork;
pub use pubsub_network::{FixturePubsubNetwork, NetworkError, PubsubNetwork};
#[cfg(test)]
pub use subscription_command::MockSubscriptionCommand;
pub use subscription_command::{FixtureSubscriptionCommand, SubscriptionCommand};
#[cfg(test)]
pub use subscription_maintenance::MockSubscriptionMaintenance;
pub use subscription_maintenance::SubscriptionMaintenance;
#[cfg(test)]
pub use topic_query::MockTopicQuery;
pub use topic_query::{FixtureTopicQuery, ListTopicsRequest, TopicQuery};
