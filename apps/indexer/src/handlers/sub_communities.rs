//! Sub-community handlers.

use actix_web::{HttpResponse, web};

use mirrorpost_core::domain::SubCommunity;
use mirrorpost_shared::dto::{CreateSubCommunityRequest, SearchQuery};

use super::{parse_address, parse_id};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/subcommunities
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateSubCommunityRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let sub_community = SubCommunity::new(
        req.sub_community_id,
        req.name,
        req.description,
        parse_address(&req.creator)?,
    );

    let created = state.services.sub_communities.create(sub_community).await?;
    tracing::info!(
        sub_community_id = created.sub_community_id,
        "Sub-community created via API"
    );
    Ok(HttpResponse::Created().json(created))
}

/// GET /api/subcommunities
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let listed = state.services.sub_communities.list().await?;
    Ok(HttpResponse::Ok().json(listed))
}

/// GET /api/subcommunities/search?q=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let found = state.services.sub_communities.search(&query.q).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// GET /api/subcommunities/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "subCommunityId")?;
    let sub_community = state.services.sub_communities.get(id).await?;
    Ok(HttpResponse::Ok().json(sub_community))
}

/// GET /api/subcommunities/{id}/posts
pub async fn posts(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "subCommunityId")?;
    // 404 for a community the chain does not know, rather than an empty list.
    state.services.sub_communities.get(id).await?;

    let posts = state.services.posts.list_for_sub_community(id).await?;
    Ok(HttpResponse::Ok().json(posts))
}
