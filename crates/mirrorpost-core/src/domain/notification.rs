use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Address, PostId};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PostLiked,
    CommentLiked,
    CommentAdded,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostLiked => "post_liked",
            Self::CommentLiked => "comment_liked",
            Self::CommentAdded => "comment_added",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post_liked" => Ok(Self::PostLiked),
            "comment_liked" => Ok(Self::CommentLiked),
            "comment_added" => Ok(Self::CommentAdded),
            other => Err(DomainError::Validation(format!(
                "invalid notification type: {other}"
            ))),
        }
    }
}

/// Notification entity - activity on content owned by `user_address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_address: Address,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub post_id: Option<PostId>,
    pub comment_id: Option<u64>,
    pub actor: Address,
    pub actor_username: Option<String>,
    pub timestamp: u64,
    pub read: bool,
}

/// Who did what to whose content.
#[derive(Debug, Clone)]
pub struct Activity {
    pub recipient: Address,
    pub actor: Address,
    pub actor_username: Option<String>,
    pub post_id: Option<PostId>,
    pub comment_id: Option<u64>,
    pub timestamp: u64,
}

impl Notification {
    /// Build a notification, or `None` when the actor owns the content.
    pub fn for_activity(kind: NotificationKind, activity: Activity) -> Option<Self> {
        if activity.actor == activity.recipient {
            return None;
        }

        // One comment yields at most one comment_added row, whatever the delivery count.
        let id = match (kind, activity.post_id, activity.comment_id) {
            (NotificationKind::CommentAdded, Some(post_id), Some(comment_id)) => Uuid::new_v5(
                &Uuid::NAMESPACE_OID,
                format!("comment_added:{post_id}:{comment_id}").as_bytes(),
            ),
            _ => Uuid::new_v4(),
        };

        Some(Self {
            id,
            user_address: activity.recipient,
            kind,
            post_id: activity.post_id,
            comment_id: activity.comment_id,
            actor: activity.actor,
            actor_username: activity.actor_username,
            timestamp: activity.timestamp,
            read: false,
        })
    }
}
