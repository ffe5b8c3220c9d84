//! # peerhub-cache
//!
//! Expiring key-value backends for PeerHub: a Redis provider for
//! production and an in-memory moka provider as the single-node
//! fallback, both behind [`peerhub_core::traits::CacheProvider`].

pub mod keys;
pub mod memory;
pub mod provider;
pub mod redis;

pub use provider::CacheManager;
