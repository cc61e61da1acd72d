//! Request middleware.
//!
//! Purpose: request lifecycle concerns such as trace correlation and access
//! logging.

pub mod trace;

pub use trace::Trace;
