//! Custom Axum extractors.

pub mod client_ip;

pub use client_ip::ClientIp;
