//! Route handlers.

pub mod health;
pub mod presence;
pub mod room;
