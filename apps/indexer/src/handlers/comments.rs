//! Comment handlers.

use actix_web::{HttpResponse, web};

use mirrorpost_core::domain::{Comment, CommentKey};
use mirrorpost_shared::dto::{CreateCommentRequest, UpdateCommentLikesRequest};

use super::{parse_address, parse_id};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/comments
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let author = parse_address(&req.author)?;

    let mut comment = Comment {
        comment_id: req.comment_id,
        post_id: req.post_id,
        sub_community_id: req.sub_community_id.unwrap_or_default(),
        author,
        username: req.username,
        content: req.content,
        timestamp: req.timestamp,
        likes: 0,
        is_deleted: false,
    };
    // Malformed input is a 400 even when the post is unknown.
    comment.validate()?;
    if req.sub_community_id.is_none() {
        comment.sub_community_id = state
            .services
            .comments
            .resolve_sub_community(req.post_id)
            .await?;
    }

    let upserted = state.services.comments.create(comment).await?;
    if upserted.created {
        tracing::info!(key = %upserted.record.key(), "Comment created via API");
        Ok(HttpResponse::Created().json(upserted.record))
    } else {
        Ok(HttpResponse::Ok().json(upserted.record))
    }
}

/// GET /api/comments/post/{postId}
pub async fn list_for_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_id(&path, "postId")?;
    let comments = state.services.comments.list_for_post(post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// PUT /api/comments/likes
pub async fn update_likes(
    state: web::Data<AppState>,
    body: web::Json<UpdateCommentLikesRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let actor = parse_address(&req.actor)?;

    let comment = state
        .services
        .comments
        .record_like(
            CommentKey::new(req.post_id, req.comment_id),
            req.likes,
            actor,
            req.actor_username,
        )
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// PUT /api/comments/delete/{postId}/{commentId}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let key = CommentKey::new(
        parse_id(&post_id, "postId")?,
        parse_id(&comment_id, "commentId")?,
    );

    let comment = state.services.comments.delete(key).await?;
    tracing::info!(key = %key, "Comment deleted via API");
    Ok(HttpResponse::Ok().json(comment))
}
