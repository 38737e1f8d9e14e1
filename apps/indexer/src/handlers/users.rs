//! User handlers.

use actix_web::{HttpResponse, web};

use mirrorpost_shared::dto::SetUsernameRequest;

use super::parse_address;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/users/username
pub async fn set_username(
    state: web::Data<AppState>,
    body: web::Json<SetUsernameRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let address = parse_address(&req.address)?;

    let user = state.services.users.set_username(address, req.username).await?;
    tracing::info!(address = %user.address, "Username set via API");
    Ok(HttpResponse::Ok().json(user))
}

/// GET /api/users/{address}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let address = parse_address(&path)?;
    let user = state.services.users.get(&address).await?;
    Ok(HttpResponse::Ok().json(user))
}
