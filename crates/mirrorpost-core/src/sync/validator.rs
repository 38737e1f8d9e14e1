//! Read-time existence validation against live contract state.
//!
//! Every listing re-checks every row, one contract query per row, in order.
//! There is no batching and no caching of negative answers: the contract's
//! view at read time decides what is served.

use std::sync::Arc;

use crate::domain::{Post, SubCommunity};
use crate::error::DomainError;
use crate::ports::{ContractReader, PostRepository};

/// What the contract says about a cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Live,
    Deleted,
    Missing,
}

#[derive(Clone)]
pub struct ExistenceValidator {
    chain: Arc<dyn ContractReader>,
    posts: Arc<dyn PostRepository>,
}

impl ExistenceValidator {
    pub fn new(chain: Arc<dyn ContractReader>, posts: Arc<dyn PostRepository>) -> Self {
        Self { chain, posts }
    }

    pub async fn post_verdict(&self, post: &Post) -> Result<Verdict, DomainError> {
        let verdict = match self.chain.get_post(post.post_id).await? {
            None => Verdict::Missing,
            Some(on_chain) if !on_chain.exists || on_chain.author.is_zero() => Verdict::Missing,
            Some(on_chain) if on_chain.is_deleted => Verdict::Deleted,
            Some(_) => Verdict::Live,
        };

        if verdict == Verdict::Deleted && post.is_active() {
            self.write_back_tombstone(post.post_id).await;
        }

        Ok(verdict)
    }

    /// Keep only the posts the contract reports as existing and not deleted.
    pub async fn filter_posts(&self, posts: Vec<Post>) -> Result<Vec<Post>, DomainError> {
        let mut live = Vec::with_capacity(posts.len());
        for post in posts {
            match self.post_verdict(&post).await? {
                Verdict::Live => live.push(post),
                verdict => {
                    tracing::debug!(post_id = post.post_id, ?verdict, "Filtered stale post");
                }
            }
        }
        Ok(live)
    }

    /// Single-record variant of [`Self::filter_posts`].
    pub async fn check_post(&self, post: Post) -> Result<Option<Post>, DomainError> {
        if post.is_deleted {
            return Ok(None);
        }
        Ok(match self.post_verdict(&post).await? {
            Verdict::Live => Some(post),
            _ => None,
        })
    }

    pub async fn sub_community_exists(&self, sub_community: &SubCommunity) -> Result<bool, DomainError> {
        Ok(self
            .chain
            .get_sub_community(sub_community.sub_community_id)
            .await?
            .is_some())
    }

    pub async fn filter_sub_communities(
        &self,
        sub_communities: Vec<SubCommunity>,
    ) -> Result<Vec<SubCommunity>, DomainError> {
        let mut live = Vec::with_capacity(sub_communities.len());
        for sub_community in sub_communities {
            if self.sub_community_exists(&sub_community).await? {
                live.push(sub_community);
            } else {
                tracing::debug!(
                    sub_community_id = sub_community.sub_community_id,
                    "Filtered sub-community unknown to the contract"
                );
            }
        }
        Ok(live)
    }

    pub async fn check_sub_community(
        &self,
        sub_community: SubCommunity,
    ) -> Result<Option<SubCommunity>, DomainError> {
        Ok(self
            .sub_community_exists(&sub_community)
            .await?
            .then_some(sub_community))
    }

    // A deletion the replicator missed; the cache only ever moves towards deleted.
    async fn write_back_tombstone(&self, post_id: u64) {
        match self.posts.mark_deleted(post_id).await {
            Ok(_) => tracing::info!(post_id, "Cached post tombstoned from chain state"),
            Err(err) => tracing::warn!(post_id, error = %err, "Failed to write back tombstone"),
        }
    }
}
