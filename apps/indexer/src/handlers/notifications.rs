//! Notification handlers.

use actix_web::{HttpResponse, web};

use mirrorpost_core::domain::{Activity, NotificationKind};
use mirrorpost_shared::MessageResponse;
use mirrorpost_shared::dto::CreateNotificationRequest;

use super::parse_address;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/notifications
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateNotificationRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let kind: NotificationKind = req.kind.parse()?;
    let activity = Activity {
        recipient: parse_address(&req.user_address)?,
        actor: parse_address(&req.actor)?,
        actor_username: req.actor_username,
        post_id: req.post_id,
        comment_id: req.comment_id,
        timestamp: req
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64),
    };

    let notification = state.services.notifications.create(kind, activity).await?;
    Ok(HttpResponse::Created().json(notification))
}

/// GET /api/notifications/{address}
pub async fn list(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let recipient = parse_address(&path)?;
    let notifications = state.services.notifications.list(&recipient).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// PUT /api/notifications/{address}/read
pub async fn mark_read(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let recipient = parse_address(&path)?;
    let updated = state.services.notifications.mark_read(&recipient).await?;
    tracing::debug!(recipient = %recipient, updated, "Notifications marked read");
    Ok(HttpResponse::Ok().json(MessageResponse::new(format!(
        "{updated} notifications marked as read"
    ))))
}
