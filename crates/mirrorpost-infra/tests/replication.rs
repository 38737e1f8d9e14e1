mod common;

use mirrorpost_core::DomainError;
use mirrorpost_core::domain::{
    ChainEvent, CommentKey, EventCursor, EventEnvelope, NotificationKind, Post,
};
use mirrorpost_core::ports::EventSource;
use mirrorpost_core::services::ServiceConfig;
use mirrorpost_core::sync::{Outcome, Replicator, RunExit};
use mirrorpost_infra::InMemoryStore;

use common::{FlakyPosts, Harness, addr, fast_retry};

fn envelope(block: u64, event: ChainEvent) -> EventEnvelope {
    EventEnvelope {
        cursor: EventCursor::new(block, 0),
        event,
    }
}

fn post_created(post_id: u64, author: &str) -> ChainEvent {
    ChainEvent::PostCreated {
        post_id,
        sub_community_id: 1,
        author: addr(author),
        username: format!("user-{author}"),
        content: "hi".into(),
        timestamp: 1_700_000_000 + post_id,
    }
}

fn comment_created(post_id: u64, comment_id: u64, author: &str) -> ChainEvent {
    ChainEvent::CommentCreated {
        post_id,
        comment_id,
        sub_community_id: Some(1),
        author: addr(author),
        username: format!("user-{author}"),
        content: "nice".into(),
        timestamp: 1_700_000_100 + comment_id,
    }
}

#[tokio::test]
async fn comment_notifies_author_and_deleted_post_disappears() {
    let h = Harness::new();
    let (owner, member, sc) = h.seed_community().await;
    let post_id = h.ledger.create_post(&owner, sc, "hi").await.unwrap();
    h.ledger.create_comment(&member, post_id, "nice").await.unwrap();
    h.sync().await;

    let notifications = h.services.notifications.list(&owner).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::CommentAdded);
    assert_eq!(notifications[0].actor, member);
    assert_eq!(notifications[0].post_id, Some(post_id));
    assert!(!notifications[0].read);

    h.ledger.delete_post(&owner, post_id).await.unwrap();
    h.sync().await;

    let err = h.services.posts.get(post_id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    let row = h.repos.posts.find_by_id(post_id).await.unwrap().unwrap();
    assert!(row.is_deleted);
}

#[tokio::test]
async fn replayed_post_created_keeps_likes_and_tombstone() {
    let h = Harness::new();
    let r = &h.replicator;

    r.apply(&post_created(1, "a")).await.unwrap();
    r.apply(&ChainEvent::PostLiked {
        post_id: 1,
        liker: addr("b"),
        likes: 3,
    })
    .await
    .unwrap();
    r.apply(&post_created(1, "a")).await.unwrap();

    let post = h.repos.posts.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(post.likes, 3);

    r.apply(&ChainEvent::PostDeleted {
        post_id: 1,
        moderator: addr("a"),
    })
    .await
    .unwrap();
    r.apply(&post_created(1, "a")).await.unwrap();

    let post = h.repos.posts.find_by_id(1).await.unwrap().unwrap();
    assert!(post.is_deleted);
    assert_eq!(post.likes, 3);
}

#[tokio::test]
async fn replayed_comment_created_notifies_once() {
    let h = Harness::new();
    h.replicator.apply(&post_created(1, "a")).await.unwrap();
    h.replicator.apply(&comment_created(1, 1, "b")).await.unwrap();
    h.replicator.apply(&comment_created(1, 1, "b")).await.unwrap();

    let notifications = h.services.notifications.list(&addr("a")).await.unwrap();
    assert_eq!(notifications.len(), 1);
}

#[tokio::test]
async fn commenting_on_own_post_does_not_notify() {
    let h = Harness::new();
    h.replicator.apply(&post_created(1, "a")).await.unwrap();
    h.replicator.apply(&comment_created(1, 1, "a")).await.unwrap();

    assert!(h.services.notifications.list(&addr("a")).await.unwrap().is_empty());
    assert_eq!(h.services.comments.list_for_post(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn comment_before_post_is_cached_without_notification() {
    let h = Harness::new();
    h.replicator.apply(&comment_created(1, 1, "b")).await.unwrap();
    h.replicator.apply(&post_created(1, "a")).await.unwrap();

    assert_eq!(h.services.comments.list_for_post(1).await.unwrap().len(), 1);
    assert!(h.services.notifications.list(&addr("a")).await.unwrap().is_empty());
}

#[tokio::test]
async fn chain_likes_set_counters_without_notifying() {
    let h = Harness::new();
    h.replicator.apply(&post_created(1, "a")).await.unwrap();
    h.replicator.apply(&comment_created(1, 1, "b")).await.unwrap();
    h.replicator
        .apply(&ChainEvent::CommentLiked {
            post_id: 1,
            comment_id: 1,
            liker: addr("c"),
            likes: 2,
        })
        .await
        .unwrap();

    let comment = h
        .repos
        .comments
        .find_by_id(CommentKey::new(1, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(comment.likes, 2);
    assert!(h.services.notifications.list(&addr("b")).await.unwrap().is_empty());
}

#[tokio::test]
async fn deletes_for_unknown_records_are_no_ops() {
    let h = Harness::new();
    let outcome = h
        .replicator
        .handle(envelope(
            1,
            ChainEvent::PostDeleted {
                post_id: 42,
                moderator: addr("a"),
            },
        ))
        .await;
    assert_eq!(outcome, Outcome::Applied);

    let outcome = h
        .replicator
        .handle(envelope(
            2,
            ChainEvent::CommentDeleted {
                post_id: 42,
                comment_id: 1,
                moderator: addr("a"),
            },
        ))
        .await;
    assert_eq!(outcome, Outcome::Applied);
    assert!(h.repos.posts.find_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn comment_without_sub_community_resolves_it_from_the_post() {
    let h = Harness::new();
    h.replicator
        .apply(&ChainEvent::PostCreated {
            post_id: 1,
            sub_community_id: 7,
            author: addr("a"),
            username: "alice".into(),
            content: "hi".into(),
            timestamp: 1,
        })
        .await
        .unwrap();
    h.replicator
        .apply(&ChainEvent::CommentCreated {
            post_id: 1,
            comment_id: 1,
            sub_community_id: None,
            author: addr("b"),
            username: "bob".into(),
            content: "nice".into(),
            timestamp: 2,
        })
        .await
        .unwrap();

    let comments = h.services.comments.list_for_post(1).await.unwrap();
    assert_eq!(comments[0].sub_community_id, 7);
}

#[tokio::test]
async fn redelivered_cursors_are_skipped() {
    let h = Harness::new();
    let event = envelope(5, post_created(1, "a"));

    assert_eq!(h.replicator.handle(event.clone()).await, Outcome::Applied);
    assert_eq!(h.replicator.handle(event).await, Outcome::Skipped);
    assert_eq!(
        h.replicator
            .handle(envelope(4, post_created(2, "a")))
            .await,
        Outcome::Skipped
    );

    let snapshot = h.replicator.snapshot();
    assert_eq!(snapshot.applied, 1);
    assert_eq!(snapshot.skipped, 2);
    assert_eq!(snapshot.last_cursor, Some(EventCursor::new(5, 0)));
}

#[tokio::test(start_paused = true)]
async fn transient_store_failures_are_retried() {
    let store = std::sync::Arc::new(InMemoryStore::new());
    let mut repos = store.repositories();
    FlakyPosts::wrap(&mut repos, 2);
    let h = Harness::with_repos(store, repos, ServiceConfig::default());

    let outcome = h.replicator.handle(envelope(1, post_created(1, "a"))).await;

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(h.replicator.snapshot().retried, 2);
    assert!(h.repos.posts.find_by_id(1).await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_drop_the_event_and_move_on() {
    let store = std::sync::Arc::new(InMemoryStore::new());
    let mut repos = store.repositories();
    FlakyPosts::wrap(&mut repos, 5);
    let h = Harness::with_repos(store, repos, ServiceConfig::default());

    let dropped = h.replicator.handle(envelope(1, post_created(1, "a"))).await;
    let next = h
        .replicator
        .handle(envelope(
            2,
            ChainEvent::UsernameSet {
                user: addr("a"),
                username: "alice".into(),
            },
        ))
        .await;

    assert_eq!(dropped, Outcome::Dropped);
    assert_eq!(next, Outcome::Applied);
    let snapshot = h.replicator.snapshot();
    assert_eq!(snapshot.dropped, 1);
    assert_eq!(snapshot.retried, 2);
    assert_eq!(snapshot.last_cursor, Some(EventCursor::new(2, 0)));
    assert!(h.repos.posts.find_by_id(1).await.unwrap().is_none());
}

#[tokio::test]
async fn permanent_failures_are_not_retried() {
    let h = Harness::new();
    // Unknown post both in the cache and on the ledger.
    let outcome = h
        .replicator
        .handle(envelope(
            1,
            ChainEvent::CommentCreated {
                post_id: 9,
                comment_id: 1,
                sub_community_id: None,
                author: addr("b"),
                username: "bob".into(),
                content: "orphan".into(),
                timestamp: 1,
            },
        ))
        .await;

    assert_eq!(outcome, Outcome::Dropped);
    assert_eq!(h.replicator.snapshot().retried, 0);
}

#[tokio::test]
async fn run_reports_stream_failure_and_resumes_after_checkpoint() {
    let h = Harness::new();
    let (owner, _, sc) = h.seed_community().await;
    h.ledger.create_post(&owner, sc, "first").await.unwrap();

    let mut subscription = h.ledger.subscribe(None).await.unwrap();
    let head = h.ledger.head().await;
    let mut checkpoint = h.replicator.watch_checkpoint();
    let replicator = h.replicator.clone();
    let task = tokio::spawn(async move { replicator.run(&mut subscription).await });

    checkpoint.wait_for(|c| *c == head).await.unwrap();
    h.ledger.interrupt("node restarted");
    let exit = task.await.unwrap();
    assert!(matches!(exit, RunExit::Failed(_)));

    h.ledger.create_post(&owner, sc, "second").await.unwrap();
    let resumed = Replicator::resuming(h.services.clone(), fast_retry(3), h.replicator.checkpoint());
    let mut subscription = h.ledger.subscribe(resumed.checkpoint()).await.unwrap();
    let first = subscription.next().await.unwrap().unwrap();
    assert!(matches!(first.event, ChainEvent::PostCreated { post_id: 2, .. }));
    assert_eq!(resumed.handle(first).await, Outcome::Applied);

    let posts: Vec<Post> = h.services.posts.list().await.unwrap();
    assert_eq!(posts.len(), 2);
}
