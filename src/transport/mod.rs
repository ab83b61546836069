//! Transports for the push endpoint
//!
//! - **http**: axum router serving `POST /push`
//! - **client**: reqwest-based `Endpoint` for calling a remote gateway
//! - **diagnostics**: health and Prometheus scrape routes

pub mod client;
pub mod diagnostics;
pub mod http;

/// W3C trace context header
pub const TRACEPARENT: &str = "traceparent";
