//! In-memory MirrorPost ledger.
//!
//! Reproduces the contract's id assignment, revert rules and event emission
//! inside one process. Every state-changing call is mined as its own block
//! with a single log. Used when no gateway is configured and by tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, broadcast};

use mirrorpost_core::domain::{
    Address, ChainEvent, EventCursor, EventEnvelope, PostId, SubCommunityId,
};
use mirrorpost_core::error::ChainError;
use mirrorpost_core::ports::{
    ChainPost, ChainSubCommunity, ChainUser, ContractReader, EventSink, EventSource,
    EventSubscription,
};

const SUBSCRIPTION_BUFFER: usize = 256;

/// A contract call the ledger refused, with the contract's revert reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reverted: {0}")]
pub struct Revert(pub &'static str);

#[derive(Debug, Clone)]
enum Signal {
    Event(EventEnvelope),
    Interrupt(String),
}

#[derive(Debug, Clone)]
struct LedgerComment {
    sub_community_id: SubCommunityId,
    is_deleted: bool,
    likes: u64,
}

#[derive(Default)]
struct LedgerState {
    block: u64,
    log: Vec<EventEnvelope>,
    sub_communities: BTreeMap<SubCommunityId, ChainSubCommunity>,
    users: HashMap<Address, String>,
    posts: BTreeMap<PostId, ChainPost>,
    comments: BTreeMap<(PostId, u64), LedgerComment>,
    comment_count: u64,
}

impl LedgerState {
    fn emit(&mut self, event: ChainEvent) -> EventEnvelope {
        self.block += 1;
        let envelope = EventEnvelope {
            cursor: EventCursor::new(self.block, 0),
            event,
        };
        self.log.push(envelope.clone());
        envelope
    }

    fn username_of(&self, user: &Address) -> Result<String, Revert> {
        self.users
            .get(user)
            .cloned()
            .ok_or(Revert("Username not set"))
    }

    fn moderator_of(&self, sub_community_id: SubCommunityId) -> Option<&Address> {
        self.sub_communities
            .get(&sub_community_id)
            .map(|s| &s.creator)
    }
}

fn check_length(value: &str, min: usize, max: usize, reason: &'static str) -> Result<(), Revert> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Revert(reason));
    }
    Ok(())
}

/// In-process contract with an append-only event log.
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    live: broadcast::Sender<Signal>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        let (live, _) = broadcast::channel(1024);
        Self {
            state: Mutex::new(LedgerState::default()),
            live,
        }
    }

    async fn commit<T>(
        &self,
        tx: impl FnOnce(&mut LedgerState) -> Result<(T, ChainEvent), Revert>,
    ) -> Result<T, Revert> {
        let mut state = self.state.lock().await;
        let (value, event) = tx(&mut *state)?;
        let envelope = state.emit(event);
        tracing::debug!(
            cursor = %envelope.cursor,
            event = envelope.event.name(),
            "Ledger event emitted"
        );
        // No receivers just means nobody is subscribed yet.
        let _ = self.live.send(Signal::Event(envelope));
        Ok(value)
    }

    pub async fn create_sub_community(
        &self,
        creator: &Address,
        name: &str,
        description: &str,
    ) -> Result<SubCommunityId, Revert> {
        self.commit(|state| {
            check_length(name, 3, 50, "Name must be 3-50 characters")?;
            check_length(description, 10, 200, "Description must be 10-200 characters")?;

            let id = state.sub_communities.len() as u64 + 1;
            state.sub_communities.insert(
                id,
                ChainSubCommunity {
                    sub_community_id: id,
                    name: name.to_string(),
                    description: description.to_string(),
                    creator: creator.clone(),
                },
            );
            Ok((
                id,
                ChainEvent::SubCommunityCreated {
                    sub_community_id: id,
                    name: name.to_string(),
                    description: description.to_string(),
                    creator: creator.clone(),
                },
            ))
        })
        .await
    }

    pub async fn set_username(&self, user: &Address, username: &str) -> Result<(), Revert> {
        self.commit(|state| {
            check_length(username, 3, 20, "Username must be 3-20 characters")?;
            let taken = state
                .users
                .iter()
                .any(|(holder, name)| name == username && holder != user);
            if taken {
                return Err(Revert("Username already taken"));
            }

            state.users.insert(user.clone(), username.to_string());
            Ok((
                (),
                ChainEvent::UsernameSet {
                    user: user.clone(),
                    username: username.to_string(),
                },
            ))
        })
        .await
    }

    pub async fn create_post(
        &self,
        author: &Address,
        sub_community_id: SubCommunityId,
        content: &str,
    ) -> Result<PostId, Revert> {
        self.commit(|state| {
            let username = state.username_of(author)?;
            if !state.sub_communities.contains_key(&sub_community_id) {
                return Err(Revert("Sub-community does not exist"));
            }
            check_length(content, 1, 1000, "Content must be 1-1000 characters")?;

            let post_id = state.posts.len() as u64 + 1;
            let timestamp = Utc::now().timestamp().max(0) as u64;
            state.posts.insert(
                post_id,
                ChainPost {
                    post_id,
                    sub_community_id,
                    author: author.clone(),
                    username: username.clone(),
                    content: content.to_string(),
                    timestamp,
                    likes: 0,
                    is_deleted: false,
                    exists: true,
                },
            );
            Ok((
                post_id,
                ChainEvent::PostCreated {
                    post_id,
                    sub_community_id,
                    author: author.clone(),
                    username,
                    content: content.to_string(),
                    timestamp,
                },
            ))
        })
        .await
    }

    pub async fn like_post(&self, liker: &Address, post_id: PostId) -> Result<u64, Revert> {
        self.commit(|state| {
            let post = state
                .posts
                .get_mut(&post_id)
                .ok_or(Revert("Post does not exist"))?;
            if post.is_deleted {
                return Err(Revert("Post is deleted"));
            }

            post.likes += 1;
            let likes = post.likes;
            Ok((
                likes,
                ChainEvent::PostLiked {
                    post_id,
                    liker: liker.clone(),
                    likes,
                },
            ))
        })
        .await
    }

    pub async fn delete_post(&self, moderator: &Address, post_id: PostId) -> Result<(), Revert> {
        self.commit(|state| {
            let sub_community_id = state
                .posts
                .get(&post_id)
                .map(|p| p.sub_community_id)
                .ok_or(Revert("Post does not exist"))?;
            if state.moderator_of(sub_community_id) != Some(moderator) {
                return Err(Revert("Only sub-community creator can perform this action"));
            }
            let post = state
                .posts
                .get_mut(&post_id)
                .ok_or(Revert("Post does not exist"))?;
            if post.is_deleted {
                return Err(Revert("Post already deleted"));
            }

            post.is_deleted = true;
            Ok((
                (),
                ChainEvent::PostDeleted {
                    post_id,
                    moderator: moderator.clone(),
                },
            ))
        })
        .await
    }

    pub async fn create_comment(
        &self,
        author: &Address,
        post_id: PostId,
        content: &str,
    ) -> Result<u64, Revert> {
        self.commit(|state| {
            let username = state.username_of(author)?;
            let post = state
                .posts
                .get(&post_id)
                .ok_or(Revert("Post does not exist"))?;
            if post.is_deleted {
                return Err(Revert("Post is deleted"));
            }
            check_length(content, 1, 500, "Content must be 1-500 characters")?;

            let sub_community_id = post.sub_community_id;
            state.comment_count += 1;
            let comment_id = state.comment_count;
            state.comments.insert(
                (post_id, comment_id),
                LedgerComment {
                    sub_community_id,
                    is_deleted: false,
                    likes: 0,
                },
            );
            Ok((
                comment_id,
                ChainEvent::CommentCreated {
                    post_id,
                    comment_id,
                    sub_community_id: Some(sub_community_id),
                    author: author.clone(),
                    username,
                    content: content.to_string(),
                    timestamp: Utc::now().timestamp().max(0) as u64,
                },
            ))
        })
        .await
    }

    pub async fn like_comment(
        &self,
        liker: &Address,
        post_id: PostId,
        comment_id: u64,
    ) -> Result<u64, Revert> {
        self.commit(|state| {
            let comment = state
                .comments
                .get_mut(&(post_id, comment_id))
                .ok_or(Revert("Comment does not exist"))?;
            if comment.is_deleted {
                return Err(Revert("Comment is deleted"));
            }

            comment.likes += 1;
            let likes = comment.likes;
            Ok((
                likes,
                ChainEvent::CommentLiked {
                    post_id,
                    comment_id,
                    liker: liker.clone(),
                    likes,
                },
            ))
        })
        .await
    }

    pub async fn delete_comment(
        &self,
        moderator: &Address,
        post_id: PostId,
        comment_id: u64,
    ) -> Result<(), Revert> {
        self.commit(|state| {
            let sub_community_id = state
                .comments
                .get(&(post_id, comment_id))
                .map(|c| c.sub_community_id)
                .ok_or(Revert("Comment does not exist"))?;
            if state.moderator_of(sub_community_id) != Some(moderator) {
                return Err(Revert("Only sub-community creator can perform this action"));
            }
            let comment = state
                .comments
                .get_mut(&(post_id, comment_id))
                .ok_or(Revert("Comment does not exist"))?;
            if comment.is_deleted {
                return Err(Revert("Comment already deleted"));
            }

            comment.is_deleted = true;
            Ok((
                (),
                ChainEvent::CommentDeleted {
                    post_id,
                    comment_id,
                    moderator: moderator.clone(),
                },
            ))
        })
        .await
    }

    /// Cursor of the most recent event, if any.
    pub async fn head(&self) -> Option<EventCursor> {
        self.state.lock().await.log.last().map(|e| e.cursor)
    }

    /// Fail every open subscription with a transport error.
    pub fn interrupt(&self, reason: &str) {
        let _ = self.live.send(Signal::Interrupt(reason.to_string()));
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractReader for InMemoryLedger {
    async fn get_post(&self, id: PostId) -> Result<Option<ChainPost>, ChainError> {
        Ok(self.state.lock().await.posts.get(&id).cloned())
    }

    async fn get_sub_community(
        &self,
        id: SubCommunityId,
    ) -> Result<Option<ChainSubCommunity>, ChainError> {
        Ok(self.state.lock().await.sub_communities.get(&id).cloned())
    }

    async fn get_user(&self, address: &Address) -> Result<Option<ChainUser>, ChainError> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .get(address)
            .map(|username| ChainUser {
                username: username.clone(),
                exists: true,
            }))
    }
}

#[async_trait]
impl EventSource for InMemoryLedger {
    async fn subscribe(&self, after: Option<EventCursor>) -> Result<EventSubscription, ChainError> {
        // Backlog and live receiver are taken under one lock so no event
        // falls between them.
        let (backlog, receiver) = {
            let state = self.state.lock().await;
            let backlog: Vec<EventEnvelope> = state
                .log
                .iter()
                .filter(|e| after.is_none_or(|cursor| e.cursor > cursor))
                .cloned()
                .collect();
            (backlog, self.live.subscribe())
        };

        let (sink, subscription) = EventSubscription::channel(SUBSCRIPTION_BUFFER);
        tracing::debug!(
            after = ?after,
            backlog = backlog.len(),
            "Ledger subscription opened"
        );
        tokio::spawn(stream_events(sink, backlog, receiver));
        Ok(subscription)
    }
}

async fn stream_events(
    sink: EventSink,
    backlog: Vec<EventEnvelope>,
    mut receiver: broadcast::Receiver<Signal>,
) {
    for envelope in backlog {
        if !sink.deliver(envelope).await {
            return;
        }
    }

    loop {
        let signal = tokio::select! {
            _ = sink.closed() => return,
            signal = receiver.recv() => signal,
        };

        match signal {
            Ok(Signal::Event(envelope)) => {
                if !sink.deliver(envelope).await {
                    return;
                }
            }
            Ok(Signal::Interrupt(reason)) => {
                sink.fail(ChainError::Transport(reason)).await;
                return;
            }
            Err(broadcast::error::RecvError::Lagged(count)) => {
                tracing::warn!(lagged = count, "Ledger subscriber lagged behind");
                sink.fail(ChainError::Transport(format!("missed {count} events")))
                    .await;
                return;
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
