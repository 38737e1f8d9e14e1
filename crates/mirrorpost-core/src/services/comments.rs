use std::sync::Arc;

use crate::domain::{Activity, Address, Comment, CommentKey, NotificationKind, PostId};
use crate::error::DomainError;
use crate::ports::{ContractReader, Repositories, Upserted};

use super::NotificationService;

#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
    chain: Arc<dyn ContractReader>,
    notifications: NotificationService,
}

impl CommentService {
    pub fn new(
        repos: Repositories,
        chain: Arc<dyn ContractReader>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            repos,
            chain,
            notifications,
        }
    }

    /// Create through the write API.
    pub async fn create(&self, comment: Comment) -> Result<Upserted<Comment>, DomainError> {
        comment.validate()?;
        self.record_created(comment).await
    }

    /// Upsert the comment and tell the post author about it.
    ///
    /// Safe to repeat: the upsert keeps likes and tombstone, and the
    /// `comment_added` notification id is derived from the comment key.
    pub async fn record_created(&self, comment: Comment) -> Result<Upserted<Comment>, DomainError> {
        let upserted = self.repos.comments.upsert(comment).await?;
        let comment = &upserted.record;
        tracing::debug!(
            key = %comment.key(),
            created = upserted.created,
            "Comment upserted"
        );

        if let Some(post) = self.repos.posts.find_by_id(comment.post_id).await? {
            self.notifications
                .notify(
                    NotificationKind::CommentAdded,
                    Activity {
                        recipient: post.author,
                        actor: comment.author.clone(),
                        actor_username: Some(comment.username.clone()),
                        post_id: Some(comment.post_id),
                        comment_id: Some(comment.comment_id),
                        timestamp: comment.timestamp,
                    },
                )
                .await?;
        }

        Ok(upserted)
    }

    /// The sub-community a comment belongs to: cached post first, contract second.
    pub async fn resolve_sub_community(&self, post_id: PostId) -> Result<u64, DomainError> {
        if let Some(post) = self.repos.posts.find_by_id(post_id).await? {
            return Ok(post.sub_community_id);
        }

        match self.chain.get_post(post_id).await? {
            Some(on_chain) if on_chain.exists => Ok(on_chain.sub_community_id),
            _ => Err(DomainError::not_found("Post", post_id)),
        }
    }

    pub async fn list_for_post(&self, post_id: PostId) -> Result<Vec<Comment>, DomainError> {
        Ok(self.repos.comments.find_by_post(post_id).await?)
    }

    pub async fn record_like(
        &self,
        key: CommentKey,
        likes: u64,
        actor: Address,
        actor_username: Option<String>,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .repos
            .comments
            .set_likes(key, likes)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", key))?;

        self.notifications
            .notify(
                NotificationKind::CommentLiked,
                Activity {
                    recipient: comment.author.clone(),
                    actor,
                    actor_username,
                    post_id: Some(key.post_id),
                    comment_id: Some(key.comment_id),
                    timestamp: chrono::Utc::now().timestamp().max(0) as u64,
                },
            )
            .await?;

        Ok(comment)
    }

    pub async fn apply_chain_likes(
        &self,
        key: CommentKey,
        likes: u64,
    ) -> Result<Option<Comment>, DomainError> {
        Ok(self.repos.comments.set_likes(key, likes).await?)
    }

    pub async fn delete(&self, key: CommentKey) -> Result<Comment, DomainError> {
        self.record_deleted(key)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", key))
    }

    pub async fn record_deleted(&self, key: CommentKey) -> Result<Option<Comment>, DomainError> {
        Ok(self.repos.comments.mark_deleted(key).await?)
    }
}
