mod common;

use std::sync::Arc;

use mirrorpost_core::DomainError;
use mirrorpost_core::domain::{
    Activity, Address, Comment, CommentKey, NotificationKind, Post, SubCommunity,
};
use mirrorpost_core::ports::ContractReader;
use mirrorpost_core::services::{NotificationService, ServiceConfig, Services};
use mirrorpost_infra::InMemoryStore;

use common::{Harness, UnreachableChain, addr};

fn cached_post(post_id: u64, author: &Address, content: &str, timestamp: u64) -> Post {
    Post::new(
        post_id,
        1,
        author.clone(),
        "owner".into(),
        content.into(),
        timestamp,
    )
}

#[tokio::test]
async fn listings_drop_posts_unknown_to_the_contract() {
    let h = Harness::new();
    let (owner, _, sc) = h.seed_community().await;
    h.ledger.create_post(&owner, sc, "real").await.unwrap();
    h.sync().await;

    // Never mined, only cached.
    h.repos
        .posts
        .upsert(cached_post(99, &owner, "ghost", u64::MAX))
        .await
        .unwrap();

    let posts = h.services.posts.list().await.unwrap();
    assert_eq!(posts.iter().map(|p| p.post_id).collect::<Vec<_>>(), vec![1]);

    let err = h.services.posts.get(99).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn filtered_listing_keeps_newest_first_order() {
    let h = Harness::new();
    let (owner, _, sc) = h.seed_community().await;
    for content in ["one", "two", "three"] {
        h.ledger.create_post(&owner, sc, content).await.unwrap();
    }
    h.sync().await;
    for (post_id, timestamp) in [(1, 30), (2, 10), (3, 20)] {
        let mut post = h.repos.posts.find_by_id(post_id).await.unwrap().unwrap();
        post.timestamp = timestamp;
        h.repos.posts.upsert(post).await.unwrap();
    }
    h.repos
        .posts
        .upsert(cached_post(50, &owner, "ghost", 25))
        .await
        .unwrap();

    let ids: Vec<u64> = h
        .services
        .posts
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.post_id)
        .collect();
    assert_eq!(ids, vec![1, 3, 2]);
}

#[tokio::test]
async fn chain_deletion_missed_by_replication_is_written_back() {
    let h = Harness::new();
    let (owner, _, sc) = h.seed_community().await;
    let post_id = h.ledger.create_post(&owner, sc, "soon gone").await.unwrap();
    h.sync().await;

    // Deleted on chain, event never replicated.
    h.ledger.delete_post(&owner, post_id).await.unwrap();

    assert!(h.services.posts.list().await.unwrap().is_empty());
    let row = h.repos.posts.find_by_id(post_id).await.unwrap().unwrap();
    assert!(row.is_deleted);
}

#[tokio::test]
async fn search_is_case_insensitive_and_validated() {
    let h = Harness::new();
    let (owner, _, sc) = h.seed_community().await;
    h.ledger.create_post(&owner, sc, "Hello Rustaceans").await.unwrap();
    h.ledger.create_post(&owner, sc, "unrelated").await.unwrap();
    h.sync().await;
    h.repos
        .posts
        .upsert(cached_post(77, &owner, "rust ghost", 1))
        .await
        .unwrap();

    let found = h.services.posts.search("  RUST ").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].content, "Hello Rustaceans");
}

#[tokio::test]
async fn sub_community_listing_is_validated() {
    let h = Harness::new();
    h.seed_community().await;
    h.sync().await;
    h.repos
        .sub_communities
        .upsert(SubCommunity::new(
            9,
            "Phantom".into(),
            "Only in the cache".into(),
            addr("a"),
        ))
        .await
        .unwrap();

    let listed = h.services.sub_communities.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Tech");

    let found = h.services.sub_communities.search("phant").await.unwrap();
    assert!(found.is_empty());
    assert!(matches!(
        h.services.sub_communities.get(9).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn unreachable_contract_fails_the_read() {
    let store = Arc::new(InMemoryStore::new());
    let repos = store.repositories();
    let chain: Arc<dyn ContractReader> = Arc::new(UnreachableChain);
    let services = Services::new(repos.clone(), chain, ServiceConfig::default());
    repos
        .posts
        .upsert(cached_post(1, &addr("a"), "hi", 1))
        .await
        .unwrap();

    let err = services.posts.list().await.unwrap_err();
    assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn verified_post_create_requires_the_contract_record() {
    let h = Harness::new();
    let (owner, _, sc) = h.seed_community().await;

    let err = h
        .services
        .posts
        .create(cached_post(1, &owner, "early", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    h.ledger.create_post(&owner, sc, "early").await.unwrap();
    let upserted = h
        .services
        .posts
        .create(cached_post(1, &owner, "early", 1))
        .await
        .unwrap();
    assert!(upserted.created);
}

#[tokio::test]
async fn unverified_post_create_only_validates_fields() {
    let h = Harness::unverified();

    let created = h
        .services
        .posts
        .create(cached_post(5, &addr("a"), "offline", 1))
        .await
        .unwrap();
    assert!(created.created);

    let too_long = "x".repeat(Post::MAX_CONTENT + 1);
    let err = h
        .services
        .posts
        .create(cached_post(6, &addr("a"), &too_long, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn duplicate_sub_community_is_rejected() {
    let h = Harness::unverified();
    let community = SubCommunity::new(1, "Tech".into(), "Tech discussions".into(), addr("a"));

    h.services
        .sub_communities
        .create(community.clone())
        .await
        .unwrap();
    let err = h
        .services
        .sub_communities
        .create(community)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Duplicate(_)));
}

#[tokio::test]
async fn username_taken_by_another_address_is_rejected() {
    let h = Harness::new();
    let alice = addr("a");
    let bob = addr("b");
    h.ledger.set_username(&alice, "alice").await.unwrap();
    h.sync().await;

    let err = h
        .services
        .users
        .set_username(bob, "alice".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Duplicate(_)));

    let user = h
        .services
        .users
        .set_username(alice.clone(), " alice ".into())
        .await
        .unwrap();
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn username_must_match_the_contract_when_verified() {
    let h = Harness::new();
    let alice = addr("a");
    h.ledger.set_username(&alice, "alice").await.unwrap();

    let err = h
        .services
        .users
        .set_username(alice.clone(), "someone".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    h.services
        .users
        .set_username(alice.clone(), "alice".into())
        .await
        .unwrap();
    assert_eq!(h.services.users.get(&alice).await.unwrap().username, "alice");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let h = Harness::new();
    let err = h.services.users.get(&addr("c")).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn notification_listing_is_capped_and_mark_read_is_bulk() {
    let h = Harness::new();
    let recipient = addr("a");
    for i in 0..60u64 {
        h.services
            .notifications
            .create(
                NotificationKind::PostLiked,
                Activity {
                    recipient: recipient.clone(),
                    actor: addr("b"),
                    actor_username: Some("bob".into()),
                    post_id: Some(1),
                    comment_id: None,
                    timestamp: i,
                },
            )
            .await
            .unwrap();
    }

    let listed = h.services.notifications.list(&recipient).await.unwrap();
    assert_eq!(listed.len() as u64, NotificationService::PAGE_SIZE);
    assert_eq!(listed[0].timestamp, 59);

    assert_eq!(h.services.notifications.mark_read(&recipient).await.unwrap(), 60);
    assert_eq!(h.services.notifications.mark_read(&recipient).await.unwrap(), 0);
}

#[tokio::test]
async fn like_through_the_api_notifies_the_author() {
    let h = Harness::unverified();
    let author = addr("a");
    h.services
        .posts
        .create(cached_post(1, &author, "hi", 1))
        .await
        .unwrap();

    let post = h
        .services
        .posts
        .record_like(1, 4, addr("b"), Some("bob".into()))
        .await
        .unwrap();
    assert_eq!(post.likes, 4);

    let notifications = h.services.notifications.list(&author).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::PostLiked);

    let err = h
        .services
        .posts
        .record_like(2, 1, addr("b"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn likes_on_deleted_records_are_not_found() {
    let h = Harness::unverified();
    let author = addr("a");
    h.services
        .posts
        .create(cached_post(1, &author, "hi", 1))
        .await
        .unwrap();
    h.services.posts.delete(1).await.unwrap();

    let err = h
        .services
        .posts
        .record_like(1, 7, addr("b"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let stored = h.repos.posts.find_by_id(1).await.unwrap().unwrap();
    assert!(stored.is_deleted);
    assert_eq!(stored.likes, 0);
    assert!(h.services.notifications.list(&author).await.unwrap().is_empty());

    let commenter = addr("c");
    let key = CommentKey::new(1, 1);
    h.services
        .comments
        .create(Comment {
            comment_id: 1,
            post_id: 1,
            sub_community_id: 1,
            author: commenter.clone(),
            username: "carol".into(),
            content: "late reply".into(),
            timestamp: 2,
            likes: 0,
            is_deleted: false,
        })
        .await
        .unwrap();
    h.services.comments.delete(key).await.unwrap();

    let err = h
        .services
        .comments
        .record_like(key, 3, addr("b"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    assert!(h.services.notifications.list(&commenter).await.unwrap().is_empty());
}

#[tokio::test]
async fn released_username_can_be_claimed_by_another_address() {
    let h = Harness::unverified();
    let alice = addr("a");
    let bob = addr("b");

    h.services
        .users
        .set_username(alice.clone(), "alice".into())
        .await
        .unwrap();
    h.services
        .users
        .set_username(alice.clone(), "alicia".into())
        .await
        .unwrap();

    let user = h
        .services
        .users
        .set_username(bob.clone(), "alice".into())
        .await
        .unwrap();
    assert_eq!(user.address, bob);
    assert_eq!(h.services.users.get(&bob).await.unwrap().username, "alice");
    assert_eq!(h.services.users.get(&alice).await.unwrap().username, "alicia");
}
