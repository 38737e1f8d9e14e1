//! Contract adapters - the in-memory ledger and the HTTP gateway client.

mod ledger;

#[cfg(feature = "gateway")]
mod gateway;

pub use ledger::{InMemoryLedger, Revert};

#[cfg(feature = "gateway")]
pub use gateway::{GatewayConfig, HttpContractGateway};
