use serde::{Deserialize, Serialize};

use super::{Address, check_length};
use crate::error::DomainError;

pub type PostId = u64;

/// Post entity - cached projection of an on-chain post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: PostId,
    pub sub_community_id: u64,
    pub author: Address,
    pub username: String,
    pub content: String,
    pub timestamp: u64,
    pub likes: u64,
    pub is_deleted: bool,
}

impl Post {
    pub const MAX_CONTENT: usize = 1000;

    /// Create an active post with no likes.
    pub fn new(
        post_id: PostId,
        sub_community_id: u64,
        author: Address,
        username: String,
        content: String,
        timestamp: u64,
    ) -> Self {
        Self {
            post_id,
            sub_community_id,
            author,
            username,
            content,
            timestamp,
            likes: 0,
            is_deleted: false,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.post_id == 0 {
            return Err(DomainError::Validation("postId must be positive".into()));
        }
        check_length("content", &self.content, 1, Self::MAX_CONTENT)
    }

    /// Merge a replayed creation into the stored record.
    ///
    /// Snapshot fields come from `incoming`; likes and the tombstone are kept.
    pub fn refreshed_with(self, incoming: Post) -> Post {
        Post {
            likes: self.likes,
            is_deleted: self.is_deleted,
            ..incoming
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Address {
        Address::parse("0x00000000000000000000000000000000000000aa").unwrap()
    }

    #[test]
    fn replayed_creation_keeps_tombstone_and_likes() {
        let mut stored = Post::new(1, 1, author(), "alice".into(), "hi".into(), 10);
        stored.likes = 4;
        stored.is_deleted = true;

        let replay = Post::new(1, 1, author(), "alice2".into(), "hi".into(), 10);
        let merged = stored.refreshed_with(replay);

        assert!(merged.is_deleted);
        assert_eq!(merged.likes, 4);
        assert_eq!(merged.username, "alice2");
    }

    #[test]
    fn content_bounds() {
        let post = Post::new(1, 1, author(), "a".into(), String::new(), 0);
        assert!(post.validate().is_err());

        let post = Post::new(1, 1, author(), "a".into(), "x".repeat(1001), 0);
        assert!(post.validate().is_err());

        let post = Post::new(1, 1, author(), "a".into(), "x".repeat(1000), 0);
        assert!(post.validate().is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let post = Post::new(7, 2, author(), "a".into(), "b".into(), 3);
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["postId"], 7);
        assert_eq!(json["subCommunityId"], 2);
        assert_eq!(json["isDeleted"], false);
    }
}
