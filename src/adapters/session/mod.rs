//! Session store adapters.
//!
//! The in-memory map serves single-instance deployments; Redis serves
//! horizontally scaled ones where rapid events from one user may land on
//! different instances.

mod in_memory;
mod redis;

pub use in_memory::InMemorySessionStore;
pub use redis::RedisSessionStore;
