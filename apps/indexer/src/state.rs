//! Application state - shared across all handlers.

use std::sync::Arc;

use mirrorpost_core::ports::{ContractReader, EventSource, Repositories};
use mirrorpost_core::services::{ServiceConfig, Services};
use mirrorpost_core::sync::{Replicator, RetryPolicy};
use mirrorpost_infra::{InMemoryLedger, InMemoryStore};

use crate::config::{AppConfig, ChainSettings, DatabaseSettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub replicator: Replicator,
    pub events: Arc<dyn EventSource>,
}

/// Contract query client and event source, usually the same adapter.
pub struct ChainAdapters {
    pub reader: Arc<dyn ContractReader>,
    pub events: Arc<dyn EventSource>,
}

impl ChainAdapters {
    pub fn ledger(ledger: Arc<InMemoryLedger>) -> Self {
        Self {
            reader: ledger.clone(),
            events: ledger,
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = build_repositories(config.database.as_ref()).await;
        let chain = build_chain(&config.chain);
        let state = Self::assemble(
            repos,
            chain,
            config.verify_writes_on_chain,
            config.replication.retry,
        );

        tracing::info!(
            verify_writes_on_chain = config.verify_writes_on_chain,
            "Application state initialized"
        );
        state
    }

    pub fn assemble(
        repos: Repositories,
        chain: ChainAdapters,
        verify_writes_on_chain: bool,
        retry: RetryPolicy,
    ) -> Self {
        let services = Services::new(
            repos,
            chain.reader,
            ServiceConfig {
                verify_writes_on_chain,
            },
        );
        let replicator = Replicator::new(services.clone(), retry);

        Self {
            services,
            replicator,
            events: chain.events,
        }
    }
}

fn in_memory_store() -> Repositories {
    Arc::new(InMemoryStore::new()).repositories()
}

#[cfg(feature = "postgres")]
async fn build_repositories(settings: Option<&DatabaseSettings>) -> Repositories {
    use mirrorpost_infra::{DatabaseConfig, connect, postgres_repositories};

    let Some(settings) = settings else {
        tracing::warn!("DATABASE_URL not set. Caching in memory; the cache is lost on restart.");
        return in_memory_store();
    };

    let mut db_config = DatabaseConfig::new(settings.url.clone());
    db_config.max_connections = settings.max_connections;
    db_config.min_connections = settings.min_connections;

    match connect(&db_config).await {
        Ok(conn) => postgres_repositories(conn),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            in_memory_store()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_repositories(_settings: Option<&DatabaseSettings>) -> Repositories {
    tracing::info!("Running without postgres feature - caching in memory");
    in_memory_store()
}

#[cfg(feature = "gateway")]
fn build_chain(settings: &ChainSettings) -> ChainAdapters {
    use mirrorpost_infra::{GatewayConfig, HttpContractGateway};

    let Some(url) = settings.gateway_url.clone() else {
        tracing::warn!("CHAIN_GATEWAY_URL not set. Using the in-memory ledger.");
        return ChainAdapters::ledger(Arc::new(InMemoryLedger::new()));
    };

    let config = GatewayConfig {
        poll_interval: settings.poll_interval,
        batch_size: settings.poll_batch,
        start_block: settings.start_block,
        ..GatewayConfig::new(url)
    };

    match HttpContractGateway::new(config) {
        Ok(gateway) => {
            let gateway = Arc::new(gateway);
            ChainAdapters {
                reader: gateway.clone(),
                events: gateway,
            }
        }
        Err(e) => {
            tracing::error!(
                "Failed to build gateway client: {}. Using the in-memory ledger.",
                e
            );
            ChainAdapters::ledger(Arc::new(InMemoryLedger::new()))
        }
    }
}

#[cfg(not(feature = "gateway"))]
fn build_chain(_settings: &ChainSettings) -> ChainAdapters {
    tracing::info!("Running without gateway feature - using the in-memory ledger");
    ChainAdapters::ledger(Arc::new(InMemoryLedger::new()))
}
