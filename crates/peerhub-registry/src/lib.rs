//! # peerhub-registry
//!
//! Durable room storage and the room registry service: connection pool
//! management, migrations, the PostgreSQL room repository, an in-memory
//! fallback store, and room creation/validation logic.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repository;
pub mod service;

pub use connection::DatabasePool;
pub use repository::PgRoomStore;
pub use service::RoomService;
