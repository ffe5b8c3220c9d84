//! # peerhub-core
//!
//! Core crate for PeerHub. Contains configuration schemas, typed
//! identifiers, domain models, the cache provider trait, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other PeerHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
