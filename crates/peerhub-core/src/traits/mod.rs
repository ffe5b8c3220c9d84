//! Trait seams between crates.

pub mod cache;
pub mod room_store;

pub use cache::CacheProvider;
pub use room_store::RoomStore;
