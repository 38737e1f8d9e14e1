use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Address, PostId, check_length};
use crate::error::DomainError;

/// Composite identity of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommentKey {
    pub post_id: PostId,
    pub comment_id: u64,
}

impl CommentKey {
    pub fn new(post_id: PostId, comment_id: u64) -> Self {
        Self {
            post_id,
            comment_id,
        }
    }
}

impl fmt::Display for CommentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.post_id, self.comment_id)
    }
}

/// Comment entity - cached projection of an on-chain comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: u64,
    pub post_id: PostId,
    pub sub_community_id: u64,
    pub author: Address,
    pub username: String,
    pub content: String,
    pub timestamp: u64,
    pub likes: u64,
    pub is_deleted: bool,
}

impl Comment {
    pub const MAX_CONTENT: usize = 500;

    pub fn key(&self) -> CommentKey {
        CommentKey::new(self.post_id, self.comment_id)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.post_id == 0 || self.comment_id == 0 {
            return Err(DomainError::Validation(
                "postId and commentId must be positive".into(),
            ));
        }
        check_length("content", &self.content, 1, Self::MAX_CONTENT)
    }

    /// Same merge rule as posts: likes and the tombstone survive a replay.
    pub fn refreshed_with(self, incoming: Comment) -> Comment {
        Comment {
            likes: self.likes,
            is_deleted: self.is_deleted,
            ..incoming
        }
    }
}
