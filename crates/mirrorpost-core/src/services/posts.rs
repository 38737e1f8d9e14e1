use std::sync::Arc;

use crate::domain::{Activity, Address, NotificationKind, Post, PostId, SubCommunityId};
use crate::error::DomainError;
use crate::ports::{ContractReader, Repositories, Upserted};
use crate::sync::ExistenceValidator;

use super::NotificationService;

#[derive(Clone)]
pub struct PostService {
    repos: Repositories,
    chain: Arc<dyn ContractReader>,
    validator: ExistenceValidator,
    notifications: NotificationService,
    verify_writes: bool,
}

impl PostService {
    pub fn new(
        repos: Repositories,
        chain: Arc<dyn ContractReader>,
        validator: ExistenceValidator,
        notifications: NotificationService,
        verify_writes: bool,
    ) -> Self {
        Self {
            repos,
            chain,
            validator,
            notifications,
            verify_writes,
        }
    }

    /// Create through the write API, after the contract confirms the post.
    pub async fn create(&self, post: Post) -> Result<Upserted<Post>, DomainError> {
        post.validate()?;

        if self.verify_writes {
            let on_chain = self.chain.get_post(post.post_id).await?;
            if !on_chain.is_some_and(|p| p.exists && !p.author.is_zero()) {
                tracing::warn!(post_id = post.post_id, "Rejected post unknown to the contract");
                return Err(DomainError::Validation(
                    "Post does not exist on blockchain".into(),
                ));
            }
        }

        self.record_created(post).await
    }

    /// Idempotent creation shared by the write API and `PostCreated`.
    pub async fn record_created(&self, post: Post) -> Result<Upserted<Post>, DomainError> {
        let upserted = self.repos.posts.upsert(post).await?;
        tracing::debug!(
            post_id = upserted.record.post_id,
            created = upserted.created,
            "Post upserted"
        );
        Ok(upserted)
    }

    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        let cached = self.repos.posts.find_active().await?;
        self.validator.filter_posts(cached).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Post>, DomainError> {
        let cached = self.repos.posts.search(query.trim()).await?;
        self.validator.filter_posts(cached).await
    }

    pub async fn list_for_sub_community(
        &self,
        sub_community_id: SubCommunityId,
    ) -> Result<Vec<Post>, DomainError> {
        let cached = self.repos.posts.find_by_sub_community(sub_community_id).await?;
        self.validator.filter_posts(cached).await
    }

    pub async fn get(&self, post_id: PostId) -> Result<Post, DomainError> {
        let cached = self
            .repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        self.validator
            .check_post(cached)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }

    /// Tombstone through the write API.
    pub async fn delete(&self, post_id: PostId) -> Result<Post, DomainError> {
        self.record_deleted(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }

    pub async fn record_deleted(&self, post_id: PostId) -> Result<Option<Post>, DomainError> {
        Ok(self.repos.posts.mark_deleted(post_id).await?)
    }

    /// Like count reported by a client that already confirmed the transaction.
    pub async fn record_like(
        &self,
        post_id: PostId,
        likes: u64,
        actor: Address,
        actor_username: Option<String>,
    ) -> Result<Post, DomainError> {
        let post = self
            .repos
            .posts
            .set_likes(post_id, likes)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        self.notifications
            .notify(
                NotificationKind::PostLiked,
                Activity {
                    recipient: post.author.clone(),
                    actor,
                    actor_username,
                    post_id: Some(post_id),
                    comment_id: None,
                    timestamp: chrono::Utc::now().timestamp().max(0) as u64,
                },
            )
            .await?;

        Ok(post)
    }

    /// Like count carried by a `PostLiked` event.
    pub async fn apply_chain_likes(
        &self,
        post_id: PostId,
        likes: u64,
    ) -> Result<Option<Post>, DomainError> {
        Ok(self.repos.posts.set_likes(post_id, likes).await?)
    }
}
