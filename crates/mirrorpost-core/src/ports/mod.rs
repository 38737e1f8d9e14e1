//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod chain;
mod repository;

pub use chain::{
    ChainPost, ChainSubCommunity, ChainUser, ContractReader, EventSink, EventSource,
    EventSubscription,
};
pub use repository::{
    BaseRepository, CommentRepository, NotificationRepository, PostRepository, Repositories,
    SubCommunityRepository, Upserted, UserRepository,
};
