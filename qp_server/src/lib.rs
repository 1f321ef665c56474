//! HTTP and WebSocket adapter over the quiz poker gateway.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
