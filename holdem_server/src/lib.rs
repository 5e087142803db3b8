//! WebSocket front end for Hold'em tables.
//!
//! The binary wires these modules together; they are exposed as a library so
//! the integration tests can stand up the same router on an ephemeral port.

pub mod api;
pub mod config;
pub mod logging;
