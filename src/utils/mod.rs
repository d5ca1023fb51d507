//! Utility functions for HTTP request handling.

pub mod client_ip;
