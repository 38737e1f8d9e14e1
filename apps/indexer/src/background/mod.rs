//! Background tasks running beside the HTTP server.

mod replication;

pub use replication::ReplicationSupervisor;
