//! Post handlers.

use actix_web::{HttpResponse, web};

use mirrorpost_core::domain::Post;
use mirrorpost_shared::dto::{CreatePostRequest, SearchQuery, UpdatePostLikesRequest};

use super::{parse_address, parse_id};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = Post::new(
        req.post_id,
        req.sub_community_id,
        parse_address(&req.author)?,
        req.username,
        req.content,
        req.timestamp,
    );

    let upserted = state.services.posts.create(post).await?;
    if upserted.created {
        tracing::info!(post_id = upserted.record.post_id, "Post created via API");
        Ok(HttpResponse::Created().json(upserted.record))
    } else {
        Ok(HttpResponse::Ok().json(upserted.record))
    }
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.services.posts.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/search?q=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.services.posts.search(&query.q).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// PUT /api/posts/likes
pub async fn update_likes(
    state: web::Data<AppState>,
    body: web::Json<UpdatePostLikesRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let actor = parse_address(&req.actor)?;

    let post = state
        .services
        .posts
        .record_like(req.post_id, req.likes, actor, req.actor_username)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/posts/{postId}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let post_id = parse_id(&path, "postId")?;
    let post = state.services.posts.get(post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{postId}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_id(&path, "postId")?;
    let post = state.services.posts.delete(post_id).await?;
    tracing::info!(post_id, "Post deleted via API");
    Ok(HttpResponse::Ok().json(post))
}
