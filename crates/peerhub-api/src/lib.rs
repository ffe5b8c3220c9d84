//! # peerhub-api
//!
//! The rendezvous API: the request/response surface external clients
//! use to create/validate rooms and publish/query/retract presence.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use state::AppState;
