//! HTTP inbound adapter exposing the topics API.
//!
//! [`router::routes`] binds operations to paths and decodes parameters;
//! [`api::PubsubApi`] is the handler contract it dispatches to.
//! [`service_api::ServiceApi`] is the production handler and
//! [`echo::EchoJoinApi`] a minimal one used to exercise the router.

pub mod api;
pub mod dto;
pub mod echo;
pub mod error;
pub mod health;
pub mod params;
pub mod router;
pub mod service_api;
pub mod state;
pub(crate) mod validation;

pub use error::ApiResult;
