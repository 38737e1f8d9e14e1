use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Address, Comment, CommentKey, Notification, Post, PostId, SubCommunity, SubCommunityId, User,
};
use crate::error::RepoError;

/// Result of an upsert: the stored document and whether it was newly inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted<T> {
    pub record: T,
    pub created: bool,
}

impl<T> Upserted<T> {
    pub fn created(record: T) -> Self {
        Self {
            record,
            created: true,
        }
    }

    pub fn existing(record: T) -> Self {
        Self {
            record,
            created: false,
        }
    }
}

/// Keyed document operations shared by every cache collection.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find a document by its unique key.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert-or-update by key, atomically per document.
    ///
    /// Each collection documents what an update keeps from the stored record.
    async fn upsert(&self, entity: T) -> Result<Upserted<T>, RepoError>;
}

/// Post cache. Upsert refreshes snapshot fields and keeps likes and tombstone.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    /// Non-deleted posts, newest first.
    async fn find_active(&self) -> Result<Vec<Post>, RepoError>;

    /// Non-deleted posts of one sub-community, newest first.
    async fn find_by_sub_community(&self, id: SubCommunityId) -> Result<Vec<Post>, RepoError>;

    /// Non-deleted posts whose content contains `needle`, ignoring case.
    async fn search(&self, needle: &str) -> Result<Vec<Post>, RepoError>;

    /// Overwrite the like count of a non-deleted post; `None` when absent or deleted.
    async fn set_likes(&self, id: PostId, likes: u64) -> Result<Option<Post>, RepoError>;

    async fn mark_deleted(&self, id: PostId) -> Result<Option<Post>, RepoError>;
}

/// Comment cache, keyed by (post id, comment id). Same upsert rule as posts.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, CommentKey> {
    /// Non-deleted comments of a post, newest first.
    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError>;

    /// Same rule as for posts: deleted comments keep their count.
    async fn set_likes(&self, key: CommentKey, likes: u64) -> Result<Option<Comment>, RepoError>;

    async fn mark_deleted(&self, key: CommentKey) -> Result<Option<Comment>, RepoError>;
}

/// Sub-community cache. Upsert inserts if absent and never overwrites.
#[async_trait]
pub trait SubCommunityRepository: BaseRepository<SubCommunity, SubCommunityId> {
    /// All sub-communities, most recently created first.
    async fn find_all(&self) -> Result<Vec<SubCommunity>, RepoError>;

    /// Name or description contains `needle`, ignoring case.
    async fn search(&self, needle: &str) -> Result<Vec<SubCommunity>, RepoError>;
}

/// User cache. Upsert replaces the username.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Address> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Notification store.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert unless a notification with the same id exists. Returns whether it was inserted.
    async fn insert(&self, notification: Notification) -> Result<bool, RepoError>;

    /// Latest notifications for a recipient, newest first.
    async fn find_for_recipient(
        &self,
        recipient: &Address,
        limit: u64,
    ) -> Result<Vec<Notification>, RepoError>;

    /// Flag every unread notification of the recipient as read.
    async fn mark_all_read(&self, recipient: &Address) -> Result<u64, RepoError>;
}

/// The cache collections, injected together into services and the replicator.
#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub sub_communities: Arc<dyn SubCommunityRepository>,
    pub users: Arc<dyn UserRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}
