//! Chain-to-cache reconciliation: replication on the write side,
//! existence validation on the read side.

mod replicator;
mod retry;
mod validator;

pub use replicator::{Outcome, ReplicationSnapshot, Replicator, RunExit};
pub use retry::{Attempted, RetryPolicy};
pub use validator::{ExistenceValidator, Verdict};
