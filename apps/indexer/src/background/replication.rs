//! Keeps one event subscription drained for the life of the process.
//!
//! When the stream fails or ends, the supervisor waits and re-subscribes
//! after the replicator's checkpoint, so nothing already processed is
//! applied twice by this process.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use mirrorpost_core::ports::EventSource;
use mirrorpost_core::sync::{Replicator, RunExit};

pub struct ReplicationSupervisor {
    replicator: Replicator,
    events: Arc<dyn EventSource>,
    restart_delay: Duration,
}

impl ReplicationSupervisor {
    pub fn new(replicator: Replicator, events: Arc<dyn EventSource>, restart_delay: Duration) -> Self {
        Self {
            replicator,
            events,
            restart_delay,
        }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Replication supervisor started");

        while !*shutdown.borrow() {
            let after = self.replicator.checkpoint();
            match self.events.subscribe(after).await {
                Ok(mut subscription) => {
                    let exit = tokio::select! {
                        exit = self.replicator.run(&mut subscription) => exit,
                        _ = shutdown.changed() => {
                            subscription.close();
                            break;
                        }
                    };

                    match exit {
                        RunExit::Ended => {
                            tracing::warn!(checkpoint = ?self.replicator.checkpoint(), "Event stream ended");
                        }
                        RunExit::Failed(err) => {
                            tracing::warn!(
                                error = %err,
                                checkpoint = ?self.replicator.checkpoint(),
                                "Event stream failed"
                            );
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, after = ?after, "Failed to subscribe to contract events");
                }
            }

            tracing::info!(delay_ms = self.restart_delay.as_millis() as u64, "Re-subscribing after delay");
            tokio::select! {
                _ = tokio::time::sleep(self.restart_delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!(
            checkpoint = ?self.replicator.checkpoint(),
            "Replication supervisor stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorpost_core::domain::Address;
    use mirrorpost_core::services::{ServiceConfig, Services};
    use mirrorpost_core::sync::RetryPolicy;
    use mirrorpost_infra::{InMemoryLedger, InMemoryStore};

    fn addr(tail: &str) -> Address {
        Address::parse(&format!("0x{tail:0>40}")).unwrap()
    }

    fn replicator(ledger: &Arc<InMemoryLedger>) -> Replicator {
        let repos = Arc::new(InMemoryStore::new()).repositories();
        let services = Services::new(repos, ledger.clone(), ServiceConfig::default());
        Replicator::new(services, RetryPolicy::default())
    }

    #[tokio::test]
    async fn resubscribes_after_stream_failure() {
        let ledger = Arc::new(InMemoryLedger::new());
        let replicator = replicator(&ledger);
        let mut checkpoint = replicator.watch_checkpoint();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let supervisor =
            ReplicationSupervisor::new(replicator.clone(), ledger.clone(), Duration::from_millis(10));
        let task = tokio::spawn(supervisor.run(shutdown_rx));

        ledger.set_username(&addr("a"), "alice").await.unwrap();
        let head = ledger.head().await;
        checkpoint.wait_for(|c| *c == head).await.unwrap();

        ledger.interrupt("node restarted");
        ledger.set_username(&addr("b"), "bob").await.unwrap();
        let head = ledger.head().await;
        checkpoint.wait_for(|c| *c == head).await.unwrap();

        let snapshot = replicator.snapshot();
        assert_eq!(snapshot.applied, 2);
        assert_eq!(snapshot.skipped, 0);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn stops_on_shutdown_while_idle() {
        let ledger = Arc::new(InMemoryLedger::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let supervisor = ReplicationSupervisor::new(
            replicator(&ledger),
            ledger.clone(),
            Duration::from_secs(60),
        );
        let task = tokio::spawn(supervisor.run(shutdown_rx));

        drop(shutdown_tx);
        task.await.unwrap();
    }
}
