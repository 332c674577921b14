//! Polls a set of network nodes for liveness and version information and
//! serves an auto-refreshing status dashboard.
//!
//! - [`core`]: node checks, aggregation, rendering and the HTTP server.
//! - [`client`]: the viewer's refresh loop and view reconciliation.
//! - [`config`]: YAML profile plus environment configuration.

pub mod client;
pub mod config;
pub mod core;
