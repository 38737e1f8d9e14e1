//! Migration CLI tool.
//!
//! Reads `DATABASE_URL`; run `migration up` before starting the indexer
//! against PostgreSQL.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_env_filter("info").init();

    tracing::info!("Running cache store migrations");
    cli::run_cli(migration::Migrator).await;
}
