//! Handwire - HTTP/1.1 from raw bytes
//!
//! Core library for request parsing, routing and response building.

pub mod config;
pub mod http;
pub mod routes;
pub mod server;
