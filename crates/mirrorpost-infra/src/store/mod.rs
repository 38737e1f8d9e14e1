//! Cache store implementations - in-memory fallback.
//! The PostgreSQL store lives in [`crate::database`].

mod memory;

pub use memory::InMemoryStore;
