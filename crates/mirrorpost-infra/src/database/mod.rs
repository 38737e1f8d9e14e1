//! PostgreSQL persistence for the cache collections.

mod connections;
pub mod entity;
mod postgres_base;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use postgres_base::PostgresRepository;
pub use postgres_repo::{
    PostgresCommentRepository, PostgresNotificationRepository, PostgresPostRepository,
    PostgresSubCommunityRepository, PostgresUserRepository, postgres_repositories,
};
