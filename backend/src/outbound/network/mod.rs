//! Pubsub network adapters.
//!
//! Only an in-process loopback is shipped: it satisfies the
//! [`PubsubNetwork`](crate::domain::ports::PubsubNetwork) port by routing
//! published messages straight back into the local registry.

pub mod loopback;

pub use loopback::{LoopbackNetwork, LoopbackReceiver, loopback};
