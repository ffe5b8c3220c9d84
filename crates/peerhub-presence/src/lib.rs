//! # peerhub-presence
//!
//! The presence store — a periodically-refreshed, TTL-expiring view of
//! which participants are reachable in each room — and the store-backed
//! request rate limiter.

pub mod rate_limit;
pub mod store;

pub use rate_limit::RateLimiter;
pub use store::PresenceStore;
