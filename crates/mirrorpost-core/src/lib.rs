//! # MirrorPost Core
//!
//! The domain layer of the MirrorPost indexer.
//! The contract's event stream is the source of truth; this crate holds the
//! entities mirrored from it, the ports the adapters implement, and the
//! reconciliation logic (replication and read-time existence validation).

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod sync;

pub use error::DomainError;
