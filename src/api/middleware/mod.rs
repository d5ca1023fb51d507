//! HTTP middleware for request processing and protection.
//!
//! - [`auth`] - Bearer token to owner resolution for report endpoints
//! - [`rate_limit`] - Per-client token buckets, proxy aware
//! - [`tracing`] - Request spans and latency logging

pub mod auth;
pub mod rate_limit;
pub mod tracing;
