//! HTTP handlers and route configuration.

mod comments;
mod health;
mod notifications;
mod posts;
mod sub_communities;
mod users;

use actix_web::web;

use mirrorpost_core::domain::Address;

use crate::middleware::error::AppError;

/// Configure all application routes.
///
/// Literal segments (`/likes`, `/search`) are registered before the
/// `{id}` routes that would otherwise capture them.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create))
                    .route("", web::get().to(posts::list))
                    .route("/search", web::get().to(posts::search))
                    .route("/likes", web::put().to(posts::update_likes))
                    .route("/{postId}", web::get().to(posts::get))
                    .route("/{postId}", web::delete().to(posts::delete)),
            )
            .service(
                web::scope("/comments")
                    .route("", web::post().to(comments::create))
                    .route("/likes", web::put().to(comments::update_likes))
                    .route("/post/{postId}", web::get().to(comments::list_for_post))
                    .route(
                        "/delete/{postId}/{commentId}",
                        web::put().to(comments::delete),
                    ),
            )
            .service(
                web::scope("/subcommunities")
                    .route("", web::post().to(sub_communities::create))
                    .route("", web::get().to(sub_communities::list))
                    .route("/search", web::get().to(sub_communities::search))
                    .route("/{id}", web::get().to(sub_communities::get))
                    .route("/{id}/posts", web::get().to(sub_communities::posts)),
            )
            .service(
                web::scope("/users")
                    .route("/username", web::post().to(users::set_username))
                    .route("/{address}", web::get().to(users::get)),
            )
            .service(
                web::scope("/notifications")
                    .route("", web::post().to(notifications::create))
                    .route("/{address}", web::get().to(notifications::list))
                    .route("/{address}/read", web::put().to(notifications::mark_read)),
            ),
    );
}

/// Numeric path segment; anything else is a 400 naming the parameter.
fn parse_id(raw: &str, name: &str) -> Result<u64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {name}")))
}

fn parse_address(raw: &str) -> Result<Address, AppError> {
    Ok(Address::parse(raw)?)
}
