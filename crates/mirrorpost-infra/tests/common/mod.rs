#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use mirrorpost_core::domain::{
    Address, EventEnvelope, Post, PostId, SubCommunityId,
};
use mirrorpost_core::error::{ChainError, RepoError};
use mirrorpost_core::ports::{
    BaseRepository, ChainPost, ChainSubCommunity, ChainUser, ContractReader, EventSource,
    PostRepository, Repositories, Upserted,
};
use mirrorpost_core::services::{ServiceConfig, Services};
use mirrorpost_core::sync::{Replicator, RetryPolicy};
use mirrorpost_infra::{InMemoryLedger, InMemoryStore};

pub fn addr(tail: &str) -> Address {
    Address::parse(&format!("0x{tail:0>40}")).unwrap()
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        delay: Duration::from_millis(10),
    }
}

/// Store, ledger, services and replicator wired the way the indexer wires them.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub repos: Repositories,
    pub ledger: Arc<InMemoryLedger>,
    pub services: Services,
    pub replicator: Replicator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn unverified() -> Self {
        Self::with_config(ServiceConfig {
            verify_writes_on_chain: false,
        })
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let repos = store.repositories();
        Self::with_repos(store, repos, config)
    }

    pub fn with_repos(store: Arc<InMemoryStore>, repos: Repositories, config: ServiceConfig) -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        let chain: Arc<dyn ContractReader> = ledger.clone();
        let services = Services::new(repos.clone(), chain, config);
        let replicator = Replicator::new(services.clone(), fast_retry(3));
        Self {
            store,
            repos,
            ledger,
            services,
            replicator,
        }
    }

    /// Replicate every ledger event emitted so far.
    pub async fn sync(&self) {
        let head = self.ledger.head().await;
        let mut subscription = self
            .ledger
            .subscribe(self.replicator.checkpoint())
            .await
            .unwrap();
        while self.replicator.checkpoint() < head {
            let envelope: EventEnvelope = subscription.next().await.unwrap().unwrap();
            self.replicator.handle(envelope).await;
        }
    }

    /// Sub-community 1 owned by `0xa`, both `0xa` and `0xb` registered.
    pub async fn seed_community(&self) -> (Address, Address, SubCommunityId) {
        let owner = addr("a");
        let member = addr("b");
        self.ledger.set_username(&owner, "owner").await.unwrap();
        self.ledger.set_username(&member, "member").await.unwrap();
        let id = self
            .ledger
            .create_sub_community(&owner, "Tech", "Tech discussions")
            .await
            .unwrap();
        (owner, member, id)
    }
}

/// Post repository that fails the first `failures` upserts with a connection error.
pub struct FlakyPosts {
    inner: Arc<dyn PostRepository>,
    failures: AtomicU32,
}

impl FlakyPosts {
    pub fn wrap(repos: &mut Repositories, failures: u32) {
        let inner = repos.posts.clone();
        repos.posts = Arc::new(Self {
            inner,
            failures: AtomicU32::new(failures),
        });
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for FlakyPosts {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn upsert(&self, entity: Post) -> Result<Upserted<Post>, RepoError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RepoError::Connection("connection reset".into()));
        }
        self.inner.upsert(entity).await
    }
}

#[async_trait]
impl PostRepository for FlakyPosts {
    async fn find_active(&self) -> Result<Vec<Post>, RepoError> {
        self.inner.find_active().await
    }

    async fn find_by_sub_community(&self, id: SubCommunityId) -> Result<Vec<Post>, RepoError> {
        self.inner.find_by_sub_community(id).await
    }

    async fn search(&self, needle: &str) -> Result<Vec<Post>, RepoError> {
        self.inner.search(needle).await
    }

    async fn set_likes(&self, id: PostId, likes: u64) -> Result<Option<Post>, RepoError> {
        self.inner.set_likes(id, likes).await
    }

    async fn mark_deleted(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        self.inner.mark_deleted(id).await
    }
}

/// Contract reader whose node is unreachable.
pub struct UnreachableChain;

#[async_trait]
impl ContractReader for UnreachableChain {
    async fn get_post(&self, _id: PostId) -> Result<Option<ChainPost>, ChainError> {
        Err(ChainError::Transport("connection refused".into()))
    }

    async fn get_sub_community(
        &self,
        _id: SubCommunityId,
    ) -> Result<Option<ChainSubCommunity>, ChainError> {
        Err(ChainError::Transport("connection refused".into()))
    }

    async fn get_user(&self, _address: &Address) -> Result<Option<ChainUser>, ChainError> {
        Err(ChainError::Transport("connection refused".into()))
    }
}
