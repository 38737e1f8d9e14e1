//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use mirrorpost_core::sync::ReplicationSnapshot;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub replication: ReplicationSnapshot,
}

/// Health check endpoint - server status and replication progress.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        replication: state.replicator.snapshot(),
    };

    HttpResponse::Ok().json(response)
}
