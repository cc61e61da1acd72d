//! Inbound adapters that translate external requests into domain port calls
//! while keeping framework details at the edge.
//!
//! HTTP handlers live under [`http`]. Messages arriving from the pubsub
//! network enter through the outbound network adapter instead, which pushes
//! them into the domain's inbound sink.

pub mod http;
