//! Use cases behind the HTTP surface and the replicator.
//!
//! Writes go through the same idempotent paths whether they come from a
//! client or from a contract event; reads of posts and sub-communities are
//! gated by the [`ExistenceValidator`].

mod comments;
mod notifications;
mod posts;
mod sub_communities;
mod users;

use std::sync::Arc;

pub use comments::CommentService;
pub use notifications::NotificationService;
pub use posts::PostService;
pub use sub_communities::SubCommunityService;
pub use users::UserService;

use crate::ports::{ContractReader, Repositories};
use crate::sync::ExistenceValidator;

#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// Ask the contract before accepting client-submitted creations.
    pub verify_writes_on_chain: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            verify_writes_on_chain: true,
        }
    }
}

/// Every service, wired to one set of repositories and one contract client.
#[derive(Clone)]
pub struct Services {
    pub posts: PostService,
    pub comments: CommentService,
    pub sub_communities: SubCommunityService,
    pub users: UserService,
    pub notifications: NotificationService,
}

impl Services {
    pub fn new(repos: Repositories, chain: Arc<dyn ContractReader>, config: ServiceConfig) -> Self {
        let verify = config.verify_writes_on_chain;
        let validator = ExistenceValidator::new(chain.clone(), repos.posts.clone());
        let notifications = NotificationService::new(repos.clone());

        Self {
            posts: PostService::new(
                repos.clone(),
                chain.clone(),
                validator.clone(),
                notifications.clone(),
                verify,
            ),
            comments: CommentService::new(repos.clone(), chain.clone(), notifications.clone()),
            sub_communities: SubCommunityService::new(
                repos.clone(),
                chain.clone(),
                validator,
                verify,
            ),
            users: UserService::new(repos, chain, verify),
            notifications,
        }
    }
}
