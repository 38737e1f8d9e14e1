//! In-memory cache store - used when no database is configured, and in tests.
//!
//! Each collection sits behind its own async RwLock; every upsert holds the
//! write lock for the whole read-merge-write, which gives per-document
//! atomicity. Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use mirrorpost_core::domain::{
    Address, Comment, CommentKey, Notification, Post, PostId, SubCommunity, SubCommunityId, User,
};
use mirrorpost_core::error::RepoError;
use mirrorpost_core::ports::{
    BaseRepository, CommentRepository, NotificationRepository, PostRepository, Repositories,
    SubCommunityRepository, Upserted, UserRepository,
};

/// In-memory document store holding every cache collection.
#[derive(Default)]
pub struct InMemoryStore {
    posts: RwLock<HashMap<PostId, Post>>,
    comments: RwLock<HashMap<CommentKey, Comment>>,
    sub_communities: RwLock<HashMap<SubCommunityId, SubCommunity>>,
    users: RwLock<HashMap<Address, User>>,
    notifications: RwLock<HashMap<Uuid, Notification>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose this store through every repository port.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            posts: self.clone(),
            comments: self.clone(),
            sub_communities: self.clone(),
            users: self.clone(),
            notifications: self.clone(),
        }
    }
}

fn newest_first_posts(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then(b.post_id.cmp(&a.post_id))
    });
    posts
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn upsert(&self, post: Post) -> Result<Upserted<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        match posts.remove(&post.post_id) {
            Some(stored) => {
                let merged = stored.refreshed_with(post);
                posts.insert(merged.post_id, merged.clone());
                Ok(Upserted::existing(merged))
            }
            None => {
                posts.insert(post.post_id, post.clone());
                Ok(Upserted::created(post))
            }
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_active(&self) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(newest_first_posts(
            posts.values().filter(|p| p.is_active()).cloned().collect(),
        ))
    }

    async fn find_by_sub_community(&self, id: SubCommunityId) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(newest_first_posts(
            posts
                .values()
                .filter(|p| p.is_active() && p.sub_community_id == id)
                .cloned()
                .collect(),
        ))
    }

    async fn search(&self, needle: &str) -> Result<Vec<Post>, RepoError> {
        let needle = needle.to_lowercase();
        let posts = self.posts.read().await;
        Ok(newest_first_posts(
            posts
                .values()
                .filter(|p| p.is_active() && p.content.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
        ))
    }

    async fn set_likes(&self, id: PostId, likes: u64) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).filter(|post| post.is_active()).map(|post| {
            post.likes = likes;
            post.clone()
        }))
    }

    async fn mark_deleted(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            post.is_deleted = true;
            post.clone()
        }))
    }
}

#[async_trait]
impl BaseRepository<Comment, CommentKey> for InMemoryStore {
    async fn find_by_id(&self, key: CommentKey) -> Result<Option<Comment>, RepoError> {
        Ok(self.comments.read().await.get(&key).cloned())
    }

    async fn upsert(&self, comment: Comment) -> Result<Upserted<Comment>, RepoError> {
        let mut comments = self.comments.write().await;
        let key = comment.key();
        match comments.remove(&key) {
            Some(stored) => {
                let merged = stored.refreshed_with(comment);
                comments.insert(key, merged.clone());
                Ok(Upserted::existing(merged))
            }
            None => {
                comments.insert(key, comment.clone());
                Ok(Upserted::created(comment))
            }
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError> {
        let comments = self.comments.read().await;
        let mut found: Vec<Comment> = comments
            .values()
            .filter(|c| c.post_id == post_id && !c.is_deleted)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.comment_id.cmp(&a.comment_id))
        });
        Ok(found)
    }

    async fn set_likes(&self, key: CommentKey, likes: u64) -> Result<Option<Comment>, RepoError> {
        let mut comments = self.comments.write().await;
        Ok(comments.get_mut(&key).filter(|comment| !comment.is_deleted).map(|comment| {
            comment.likes = likes;
            comment.clone()
        }))
    }

    async fn mark_deleted(&self, key: CommentKey) -> Result<Option<Comment>, RepoError> {
        let mut comments = self.comments.write().await;
        Ok(comments.get_mut(&key).map(|comment| {
            comment.is_deleted = true;
            comment.clone()
        }))
    }
}

#[async_trait]
impl BaseRepository<SubCommunity, SubCommunityId> for InMemoryStore {
    async fn find_by_id(&self, id: SubCommunityId) -> Result<Option<SubCommunity>, RepoError> {
        Ok(self.sub_communities.read().await.get(&id).cloned())
    }

    async fn upsert(&self, sub_community: SubCommunity) -> Result<Upserted<SubCommunity>, RepoError> {
        let mut sub_communities = self.sub_communities.write().await;
        if let Some(stored) = sub_communities.get(&sub_community.sub_community_id) {
            return Ok(Upserted::existing(stored.clone()));
        }
        sub_communities.insert(sub_community.sub_community_id, sub_community.clone());
        Ok(Upserted::created(sub_community))
    }
}

#[async_trait]
impl SubCommunityRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<SubCommunity>, RepoError> {
        let sub_communities = self.sub_communities.read().await;
        let mut all: Vec<SubCommunity> = sub_communities.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sub_community_id.cmp(&a.sub_community_id))
        });
        Ok(all)
    }

    async fn search(&self, needle: &str) -> Result<Vec<SubCommunity>, RepoError> {
        let needle = needle.to_lowercase();
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|sc| sc.matches(&needle))
            .collect())
    }
}

#[async_trait]
impl BaseRepository<User, Address> for InMemoryStore {
    async fn find_by_id(&self, address: Address) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&address).cloned())
    }

    async fn upsert(&self, user: User) -> Result<Upserted<User>, RepoError> {
        let mut users = self.users.write().await;
        let created = users.insert(user.address.clone(), user.clone()).is_none();
        Ok(Upserted { record: user, created })
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert(&self, notification: Notification) -> Result<bool, RepoError> {
        let mut notifications = self.notifications.write().await;
        if notifications.contains_key(&notification.id) {
            return Ok(false);
        }
        notifications.insert(notification.id, notification);
        Ok(true)
    }

    async fn find_for_recipient(
        &self,
        recipient: &Address,
        limit: u64,
    ) -> Result<Vec<Notification>, RepoError> {
        let notifications = self.notifications.read().await;
        let mut found: Vec<Notification> = notifications
            .values()
            .filter(|n| &n.user_address == recipient)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        found.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(found)
    }

    async fn mark_all_read(&self, recipient: &Address) -> Result<u64, RepoError> {
        let mut notifications = self.notifications.write().await;
        let mut updated = 0;
        for notification in notifications
            .values_mut()
            .filter(|n| &n.user_address == recipient && !n.read)
        {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
