//! Event-driven replication of contract state into the cache.
//!
//! One subscription is drained by one loop, one event at a time, in chain
//! order. Every handler is an idempotent upsert or a monotonic update, so
//! at-least-once delivery and races with the write API are harmless.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::{ChainEvent, Comment, CommentKey, EventCursor, EventEnvelope, Post, SubCommunity};
use crate::error::{ChainError, DomainError};
use crate::ports::EventSubscription;
use crate::services::Services;

use super::RetryPolicy;

/// Counters exposed for operational visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSnapshot {
    pub applied: u64,
    pub retried: u64,
    pub dropped: u64,
    pub skipped: u64,
    pub last_cursor: Option<EventCursor>,
}

struct Counters {
    applied: AtomicU64,
    retried: AtomicU64,
    dropped: AtomicU64,
    skipped: AtomicU64,
    checkpoint: watch::Sender<Option<EventCursor>>,
}

/// What happened to one delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// At or before the checkpoint; already handled.
    Skipped,
    /// Failed permanently or exhausted its retries.
    Dropped,
}

/// Why [`Replicator::run`] returned.
#[derive(Debug)]
pub enum RunExit {
    /// The producer finished or the subscription was closed.
    Ended,
    /// The producer reported a failure; re-subscribe after the checkpoint.
    Failed(ChainError),
}

#[derive(Clone)]
pub struct Replicator {
    services: Services,
    retry: RetryPolicy,
    counters: Arc<Counters>,
}

impl Replicator {
    pub fn new(services: Services, retry: RetryPolicy) -> Self {
        Self::resuming(services, retry, None)
    }

    /// Start with a known checkpoint; events at or before it are skipped.
    pub fn resuming(services: Services, retry: RetryPolicy, checkpoint: Option<EventCursor>) -> Self {
        let (checkpoint, _) = watch::channel(checkpoint);
        Self {
            services,
            retry,
            counters: Arc::new(Counters {
                applied: AtomicU64::new(0),
                retried: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
                skipped: AtomicU64::new(0),
                checkpoint,
            }),
        }
    }

    /// Cursor of the last event processed, applied or dropped.
    pub fn checkpoint(&self) -> Option<EventCursor> {
        *self.counters.checkpoint.borrow()
    }

    /// Watch the checkpoint advance.
    pub fn watch_checkpoint(&self) -> watch::Receiver<Option<EventCursor>> {
        self.counters.checkpoint.subscribe()
    }

    pub fn snapshot(&self) -> ReplicationSnapshot {
        ReplicationSnapshot {
            applied: self.counters.applied.load(Ordering::Relaxed),
            retried: self.counters.retried.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            last_cursor: self.checkpoint(),
        }
    }

    /// Drain a subscription until it ends.
    pub async fn run(&self, subscription: &mut EventSubscription) -> RunExit {
        tracing::info!(checkpoint = ?self.checkpoint(), "Replication loop started");

        while let Some(delivery) = subscription.next().await {
            match delivery {
                Ok(envelope) => {
                    self.handle(envelope).await;
                }
                Err(err) => {
                    tracing::error!(error = %err, checkpoint = ?self.checkpoint(), "Event stream failed");
                    return RunExit::Failed(err);
                }
            }
        }

        tracing::info!(checkpoint = ?self.checkpoint(), "Replication loop ended");
        RunExit::Ended
    }

    /// Apply one event with bounded retries, then advance the checkpoint.
    pub async fn handle(&self, envelope: EventEnvelope) -> Outcome {
        let EventEnvelope { cursor, event } = envelope;

        if self.checkpoint().is_some_and(|done| cursor <= done) {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%cursor, event = event.name(), "Event already processed");
            return Outcome::Skipped;
        }

        let label = format!("{} at {}", event.name(), cursor);
        let attempted = self.retry.run(&label, || self.apply(&event)).await;
        if attempted.attempts > 1 {
            self.counters
                .retried
                .fetch_add(u64::from(attempted.attempts - 1), Ordering::Relaxed);
        }

        let outcome = match attempted.result {
            Ok(()) => {
                self.counters.applied.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%cursor, event = event.name(), "Event applied");
                Outcome::Applied
            }
            Err(err) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    %cursor,
                    event = event.name(),
                    attempts = attempted.attempts,
                    error = %err,
                    "Dropping event; cache is out of sync until backfilled"
                );
                Outcome::Dropped
            }
        };

        self.counters.checkpoint.send_replace(Some(cursor));
        outcome
    }

    /// Apply one event once, without retries.
    pub async fn apply(&self, event: &ChainEvent) -> Result<(), DomainError> {
        match event.clone() {
            ChainEvent::SubCommunityCreated {
                sub_community_id,
                name,
                description,
                creator,
            } => {
                let sub_community =
                    SubCommunity::new(sub_community_id, name, description, creator);
                self.services
                    .sub_communities
                    .record_created(sub_community)
                    .await?;
            }
            ChainEvent::UsernameSet { user, username } => {
                self.services.users.record_username(user, username).await?;
            }
            ChainEvent::PostCreated {
                post_id,
                sub_community_id,
                author,
                username,
                content,
                timestamp,
            } => {
                let post = Post::new(
                    post_id,
                    sub_community_id,
                    author,
                    username,
                    content,
                    timestamp,
                );
                self.services.posts.record_created(post).await?;
            }
            ChainEvent::PostLiked { post_id, likes, .. } => {
                if self
                    .services
                    .posts
                    .apply_chain_likes(post_id, likes)
                    .await?
                    .is_none()
                {
                    tracing::warn!(post_id, "PostLiked for a post missing from the cache or deleted");
                }
            }
            ChainEvent::PostDeleted { post_id, moderator } => {
                if self.services.posts.record_deleted(post_id).await?.is_none() {
                    tracing::warn!(post_id, %moderator, "PostDeleted for a post missing from the cache");
                }
            }
            ChainEvent::CommentCreated {
                post_id,
                comment_id,
                sub_community_id,
                author,
                username,
                content,
                timestamp,
            } => {
                let sub_community_id = match sub_community_id {
                    Some(id) => id,
                    None => {
                        self.services
                            .comments
                            .resolve_sub_community(post_id)
                            .await?
                    }
                };
                let comment = Comment {
                    comment_id,
                    post_id,
                    sub_community_id,
                    author,
                    username,
                    content,
                    timestamp,
                    likes: 0,
                    is_deleted: false,
                };
                self.services.comments.record_created(comment).await?;
            }
            ChainEvent::CommentLiked {
                post_id,
                comment_id,
                likes,
                ..
            } => {
                let key = CommentKey::new(post_id, comment_id);
                if self
                    .services
                    .comments
                    .apply_chain_likes(key, likes)
                    .await?
                    .is_none()
                {
                    tracing::warn!(%key, "CommentLiked for a comment missing from the cache or deleted");
                }
            }
            ChainEvent::CommentDeleted {
                post_id,
                comment_id,
                moderator,
            } => {
                let key = CommentKey::new(post_id, comment_id);
                if self.services.comments.record_deleted(key).await?.is_none() {
                    tracing::warn!(%key, %moderator, "CommentDeleted for a comment missing from the cache");
                }
            }
        }
        Ok(())
    }
}
