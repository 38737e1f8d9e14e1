//! PostgreSQL repository implementations.
//!
//! Upserts are single `INSERT .. ON CONFLICT` statements, so the merge rule
//! of each collection is applied atomically by the database.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, OnConflict, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use mirrorpost_core::domain::{
    Address, Comment, CommentKey, Notification, Post, PostId, SubCommunity, SubCommunityId, User,
};
use mirrorpost_core::error::RepoError;
use mirrorpost_core::ports::{
    BaseRepository, CommentRepository, NotificationRepository, PostRepository, Repositories,
    SubCommunityRepository, Upserted, UserRepository,
};

use super::entity::{comment, notification, post, sub_community, to_i64, user};
use super::postgres_base::{PostgresRepository, contains_pattern, db_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresRepository<post::Entity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresRepository<comment::Entity>;

/// PostgreSQL sub-community repository.
pub type PostgresSubCommunityRepository = PostgresRepository<sub_community::Entity>;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresRepository<user::Entity>;

/// PostgreSQL notification repository.
pub type PostgresNotificationRepository = PostgresRepository<notification::Entity>;

/// Every repository port backed by one connection pool.
pub fn postgres_repositories(db: DbConn) -> Repositories {
    let db = Arc::new(db);
    Repositories {
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db.clone())),
        sub_communities: Arc::new(PostgresSubCommunityRepository::new(db.clone())),
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        notifications: Arc::new(PostgresNotificationRepository::new(db)),
    }
}

/// Rows affected by an insert that may hit `ON CONFLICT DO NOTHING`.
fn inserted_rows(result: Result<u64, DbErr>) -> Result<u64, RepoError> {
    match result {
        Ok(rows) => Ok(rows),
        Err(DbErr::RecordNotInserted) => Ok(0),
        Err(e) => Err(db_err(e)),
    }
}

fn lower_like(column: impl IntoColumnRef, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(contains_pattern(needle)).escape('\\'))
}

#[async_trait]
impl BaseRepository<Post, PostId> for PostgresPostRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        self.fetch_one(post::Entity::find_by_id(to_i64(id))).await
    }

    async fn upsert(&self, entity: Post) -> Result<Upserted<Post>, RepoError> {
        let id = entity.post_id;
        let existed = self.find_by_id(id).await?.is_some();

        // Likes and the tombstone are left out of the update set.
        post::Entity::insert(post::ActiveModel::from(entity))
            .on_conflict(
                OnConflict::column(post::Column::PostId)
                    .update_columns([
                        post::Column::SubCommunityId,
                        post::Column::Author,
                        post::Column::Username,
                        post::Column::Content,
                        post::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn())
            .await
            .map_err(db_err)?;

        let stored = self.find_by_id(id).await?.ok_or(RepoError::NotFound)?;
        Ok(Upserted {
            record: stored,
            created: !existed,
        })
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_active(&self) -> Result<Vec<Post>, RepoError> {
        self.fetch_all(
            post::Entity::find()
                .filter(post::Column::IsDeleted.eq(false))
                .order_by_desc(post::Column::Timestamp)
                .order_by_desc(post::Column::PostId),
        )
        .await
    }

    async fn find_by_sub_community(&self, id: SubCommunityId) -> Result<Vec<Post>, RepoError> {
        self.fetch_all(
            post::Entity::find()
                .filter(post::Column::IsDeleted.eq(false))
                .filter(post::Column::SubCommunityId.eq(to_i64(id)))
                .order_by_desc(post::Column::Timestamp)
                .order_by_desc(post::Column::PostId),
        )
        .await
    }

    async fn search(&self, needle: &str) -> Result<Vec<Post>, RepoError> {
        self.fetch_all(
            post::Entity::find()
                .filter(post::Column::IsDeleted.eq(false))
                .filter(lower_like(post::Column::Content, needle))
                .order_by_desc(post::Column::Timestamp)
                .order_by_desc(post::Column::PostId),
        )
        .await
    }

    async fn set_likes(&self, id: PostId, likes: u64) -> Result<Option<Post>, RepoError> {
        let result = post::Entity::update_many()
            .col_expr(post::Column::Likes, Expr::value(to_i64(likes)))
            .filter(post::Column::PostId.eq(to_i64(id)))
            .filter(post::Column::IsDeleted.eq(false))
            .exec(self.conn())
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn mark_deleted(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let result = post::Entity::update_many()
            .col_expr(post::Column::IsDeleted, Expr::value(true))
            .filter(post::Column::PostId.eq(to_i64(id)))
            .exec(self.conn())
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}

#[async_trait]
impl BaseRepository<Comment, CommentKey> for PostgresCommentRepository {
    async fn find_by_id(&self, key: CommentKey) -> Result<Option<Comment>, RepoError> {
        self.fetch_one(comment::Entity::find_by_id((
            to_i64(key.post_id),
            to_i64(key.comment_id),
        )))
        .await
    }

    async fn upsert(&self, entity: Comment) -> Result<Upserted<Comment>, RepoError> {
        let key = entity.key();
        let existed = self.find_by_id(key).await?.is_some();

        comment::Entity::insert(comment::ActiveModel::from(entity))
            .on_conflict(
                OnConflict::columns([comment::Column::PostId, comment::Column::CommentId])
                    .update_columns([
                        comment::Column::SubCommunityId,
                        comment::Column::Author,
                        comment::Column::Username,
                        comment::Column::Content,
                        comment::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn())
            .await
            .map_err(db_err)?;

        let stored = self.find_by_id(key).await?.ok_or(RepoError::NotFound)?;
        Ok(Upserted {
            record: stored,
            created: !existed,
        })
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError> {
        self.fetch_all(
            comment::Entity::find()
                .filter(comment::Column::PostId.eq(to_i64(post_id)))
                .filter(comment::Column::IsDeleted.eq(false))
                .order_by_desc(comment::Column::Timestamp)
                .order_by_desc(comment::Column::CommentId),
        )
        .await
    }

    async fn set_likes(&self, key: CommentKey, likes: u64) -> Result<Option<Comment>, RepoError> {
        let result = comment::Entity::update_many()
            .col_expr(comment::Column::Likes, Expr::value(to_i64(likes)))
            .filter(comment::Column::PostId.eq(to_i64(key.post_id)))
            .filter(comment::Column::CommentId.eq(to_i64(key.comment_id)))
            .filter(comment::Column::IsDeleted.eq(false))
            .exec(self.conn())
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(key).await
    }

    async fn mark_deleted(&self, key: CommentKey) -> Result<Option<Comment>, RepoError> {
        let result = comment::Entity::update_many()
            .col_expr(comment::Column::IsDeleted, Expr::value(true))
            .filter(comment::Column::PostId.eq(to_i64(key.post_id)))
            .filter(comment::Column::CommentId.eq(to_i64(key.comment_id)))
            .exec(self.conn())
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(key).await
    }
}

#[async_trait]
impl BaseRepository<SubCommunity, SubCommunityId> for PostgresSubCommunityRepository {
    async fn find_by_id(&self, id: SubCommunityId) -> Result<Option<SubCommunity>, RepoError> {
        self.fetch_one(sub_community::Entity::find_by_id(to_i64(id)))
            .await
    }

    async fn upsert(&self, entity: SubCommunity) -> Result<Upserted<SubCommunity>, RepoError> {
        let id = entity.sub_community_id;
        let rows = inserted_rows(
            sub_community::Entity::insert(sub_community::ActiveModel::from(entity.clone()))
                .on_conflict(
                    OnConflict::column(sub_community::Column::SubCommunityId)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(self.conn())
                .await,
        )?;

        if rows > 0 {
            return Ok(Upserted::created(entity));
        }
        let stored = self.find_by_id(id).await?.ok_or(RepoError::NotFound)?;
        Ok(Upserted::existing(stored))
    }
}

#[async_trait]
impl SubCommunityRepository for PostgresSubCommunityRepository {
    async fn find_all(&self) -> Result<Vec<SubCommunity>, RepoError> {
        self.fetch_all(
            sub_community::Entity::find()
                .order_by_desc(sub_community::Column::CreatedAt)
                .order_by_desc(sub_community::Column::SubCommunityId),
        )
        .await
    }

    async fn search(&self, needle: &str) -> Result<Vec<SubCommunity>, RepoError> {
        self.fetch_all(
            sub_community::Entity::find()
                .filter(
                    Condition::any()
                        .add(lower_like(sub_community::Column::Name, needle))
                        .add(lower_like(sub_community::Column::Description, needle)),
                )
                .order_by_desc(sub_community::Column::CreatedAt)
                .order_by_desc(sub_community::Column::SubCommunityId),
        )
        .await
    }
}

#[async_trait]
impl BaseRepository<User, Address> for PostgresUserRepository {
    async fn find_by_id(&self, address: Address) -> Result<Option<User>, RepoError> {
        self.fetch_one(user::Entity::find_by_id(String::from(address)))
            .await
    }

    async fn upsert(&self, entity: User) -> Result<Upserted<User>, RepoError> {
        let existed = self.find_by_id(entity.address.clone()).await?.is_some();

        user::Entity::insert(user::ActiveModel::from(entity.clone()))
            .on_conflict(
                OnConflict::column(user::Column::Address)
                    .update_columns([user::Column::Username, user::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(self.conn())
            .await
            .map_err(db_err)?;

        Ok(Upserted {
            record: entity,
            created: !existed,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");
        self.fetch_one(user::Entity::find().filter(user::Column::Username.eq(username)))
            .await
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn insert(&self, entity: Notification) -> Result<bool, RepoError> {
        let rows = inserted_rows(
            notification::Entity::insert(notification::ActiveModel::from(entity))
                .on_conflict(
                    OnConflict::column(notification::Column::Id)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(self.conn())
                .await,
        )?;
        Ok(rows > 0)
    }

    async fn find_for_recipient(
        &self,
        recipient: &Address,
        limit: u64,
    ) -> Result<Vec<Notification>, RepoError> {
        self.fetch_all(
            notification::Entity::find()
                .filter(notification::Column::UserAddress.eq(recipient.as_str()))
                .order_by_desc(notification::Column::Timestamp)
                .limit(limit),
        )
        .await
    }

    async fn mark_all_read(&self, recipient: &Address) -> Result<u64, RepoError> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::Read, Expr::value(true))
            .filter(notification::Column::UserAddress.eq(recipient.as_str()))
            .filter(notification::Column::Read.eq(false))
            .exec(self.conn())
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}
