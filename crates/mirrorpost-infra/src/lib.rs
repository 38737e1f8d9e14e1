//! # MirrorPost Infrastructure
//!
//! Concrete implementations of the ports defined in `mirrorpost-core`:
//! cache stores and contract adapters.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store and ledger only
//! - `postgres` - PostgreSQL cache store via SeaORM
//! - `gateway` - HTTP contract gateway client via reqwest

pub mod chain;
pub mod store;

#[cfg(feature = "postgres")]
pub mod database;

// Re-exports - In-Memory
pub use chain::InMemoryLedger;
pub use store::InMemoryStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, connect, postgres_repositories};

#[cfg(feature = "gateway")]
pub use chain::{GatewayConfig, HttpContractGateway};
