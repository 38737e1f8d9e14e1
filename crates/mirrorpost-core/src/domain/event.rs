//! Contract events as delivered by an event subscription.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Address, PostId, SubCommunityId};

/// Position of an event in the chain's total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCursor {
    pub block_number: u64,
    pub log_index: u64,
}

impl EventCursor {
    pub fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

impl fmt::Display for EventCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}

/// A MirrorPost contract event with its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "args", rename_all_fields = "camelCase")]
pub enum ChainEvent {
    SubCommunityCreated {
        sub_community_id: SubCommunityId,
        name: String,
        description: String,
        creator: Address,
    },
    UsernameSet {
        user: Address,
        username: String,
    },
    PostCreated {
        post_id: PostId,
        sub_community_id: SubCommunityId,
        author: Address,
        username: String,
        content: String,
        timestamp: u64,
    },
    PostLiked {
        post_id: PostId,
        liker: Address,
        likes: u64,
    },
    PostDeleted {
        post_id: PostId,
        moderator: Address,
    },
    CommentCreated {
        post_id: PostId,
        comment_id: u64,
        #[serde(default)]
        sub_community_id: Option<SubCommunityId>,
        author: Address,
        username: String,
        content: String,
        timestamp: u64,
    },
    CommentLiked {
        post_id: PostId,
        comment_id: u64,
        liker: Address,
        likes: u64,
    },
    CommentDeleted {
        post_id: PostId,
        comment_id: u64,
        moderator: Address,
    },
}

impl ChainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubCommunityCreated { .. } => "SubCommunityCreated",
            Self::UsernameSet { .. } => "UsernameSet",
            Self::PostCreated { .. } => "PostCreated",
            Self::PostLiked { .. } => "PostLiked",
            Self::PostDeleted { .. } => "PostDeleted",
            Self::CommentCreated { .. } => "CommentCreated",
            Self::CommentLiked { .. } => "CommentLiked",
            Self::CommentDeleted { .. } => "CommentDeleted",
        }
    }
}

/// An event together with its chain position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub cursor: EventCursor,
    #[serde(flatten)]
    pub event: ChainEvent,
}
