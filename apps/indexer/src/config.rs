//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use mirrorpost_core::sync::RetryPolicy;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL cache store; the in-memory store when absent.
    pub database: Option<DatabaseSettings>,
    pub chain: ChainSettings,
    pub replication: ReplicationSettings,
    /// Ask the contract before accepting client-submitted creations.
    pub verify_writes_on_chain: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ChainSettings {
    /// Contract gateway; the in-memory ledger when absent.
    pub gateway_url: Option<String>,
    pub poll_interval: Duration,
    pub poll_batch: u32,
    pub start_block: u64,
}

#[derive(Debug, Clone)]
pub struct ReplicationSettings {
    pub retry: RetryPolicy,
    /// Pause before re-subscribing after the event stream ends.
    pub restart_delay: Duration,
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn millis_or(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn flag_or(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseSettings {
            url,
            max_connections: var_or("DB_MAX_CONNECTIONS", 20),
            min_connections: var_or("DB_MIN_CONNECTIONS", 2),
        });

        let chain = ChainSettings {
            gateway_url: env::var("CHAIN_GATEWAY_URL").ok().filter(|u| !u.is_empty()),
            poll_interval: millis_or("CHAIN_POLL_INTERVAL_MS", defaults.chain.poll_interval),
            poll_batch: var_or("CHAIN_POLL_BATCH", defaults.chain.poll_batch),
            start_block: var_or("CHAIN_START_BLOCK", defaults.chain.start_block),
        };

        let replication = ReplicationSettings {
            retry: RetryPolicy {
                max_attempts: var_or(
                    "REPLICATOR_MAX_ATTEMPTS",
                    defaults.replication.retry.max_attempts,
                ),
                delay: millis_or(
                    "REPLICATOR_RETRY_DELAY_MS",
                    defaults.replication.retry.delay,
                ),
            },
            restart_delay: millis_or(
                "REPLICATOR_RESTART_DELAY_MS",
                defaults.replication.restart_delay,
            ),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: var_or("PORT", defaults.port),
            database,
            chain,
            replication,
            verify_writes_on_chain: flag_or(
                "VERIFY_WRITES_ON_CHAIN",
                defaults.verify_writes_on_chain,
            ),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database: None,
            chain: ChainSettings {
                gateway_url: None,
                poll_interval: Duration::from_millis(2000),
                poll_batch: 100,
                start_block: 0,
            },
            replication: ReplicationSettings {
                retry: RetryPolicy::default(),
                restart_delay: Duration::from_millis(5000),
            },
            verify_writes_on_chain: true,
        }
    }
}
