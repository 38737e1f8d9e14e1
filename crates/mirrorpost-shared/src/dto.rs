//! Data Transfer Objects - request bodies and query strings of the API.
//!
//! Field names are camelCase on the wire. Addresses travel as strings and
//! are checked by the server.

use serde::{Deserialize, Serialize};

/// POST /api/posts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub post_id: u64,
    pub sub_community_id: u64,
    pub author: String,
    pub username: String,
    pub content: String,
    pub timestamp: u64,
}

/// PUT /api/posts/likes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostLikesRequest {
    pub post_id: u64,
    pub likes: u64,
    /// Who liked; the post author is notified unless it is themselves.
    pub actor: String,
    #[serde(default)]
    pub actor_username: Option<String>,
}

/// POST /api/comments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub comment_id: u64,
    pub post_id: u64,
    /// Looked up from the post when omitted.
    #[serde(default)]
    pub sub_community_id: Option<u64>,
    pub author: String,
    pub username: String,
    pub content: String,
    pub timestamp: u64,
}

/// PUT /api/comments/likes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentLikesRequest {
    pub post_id: u64,
    pub comment_id: u64,
    pub likes: u64,
    pub actor: String,
    #[serde(default)]
    pub actor_username: Option<String>,
}

/// POST /api/subcommunities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubCommunityRequest {
    pub sub_community_id: u64,
    pub name: String,
    pub description: String,
    pub creator: String,
}

/// POST /api/users/username
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetUsernameRequest {
    pub address: String,
    pub username: String,
}

/// POST /api/notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub user_address: String,
    /// `post_liked`, `comment_liked` or `comment_added`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub post_id: Option<u64>,
    #[serde(default)]
    pub comment_id: Option<u64>,
    pub actor: String,
    #[serde(default)]
    pub actor_username: Option<String>,
    /// Unix seconds; the server clock when omitted.
    #[serde(default)]
    pub timestamp: Option<u64>,
}

/// `?q=` of the search endpoints. A missing query matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
