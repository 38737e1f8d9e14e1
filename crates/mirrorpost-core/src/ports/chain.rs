//! Contract ports - point queries and the event subscription.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::domain::{Address, EventCursor, EventEnvelope, PostId, SubCommunityId};
use crate::error::ChainError;

/// `getPost` as reported by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainPost {
    pub post_id: PostId,
    pub sub_community_id: SubCommunityId,
    pub author: Address,
    pub username: String,
    pub content: String,
    pub timestamp: u64,
    pub likes: u64,
    pub is_deleted: bool,
    pub exists: bool,
}

impl ChainPost {
    /// Existing and not deleted.
    pub fn is_live(&self) -> bool {
        self.exists && !self.is_deleted && !self.author.is_zero()
    }
}

/// `getSubCommunity` as reported by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSubCommunity {
    pub sub_community_id: SubCommunityId,
    pub name: String,
    pub description: String,
    pub creator: Address,
}

/// `getUser` as reported by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainUser {
    pub username: String,
    pub exists: bool,
}

/// Read-only view of live contract state.
///
/// `Ok(None)` means the contract does not know the entity; `Err` means the
/// contract could not be asked.
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn get_post(&self, id: PostId) -> Result<Option<ChainPost>, ChainError>;

    async fn get_sub_community(
        &self,
        id: SubCommunityId,
    ) -> Result<Option<ChainSubCommunity>, ChainError>;

    async fn get_user(&self, address: &Address) -> Result<Option<ChainUser>, ChainError>;
}

/// Source of contract events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Open a subscription yielding events strictly after `after`
    /// (from the configured start when `None`), in chain order.
    async fn subscribe(&self, after: Option<EventCursor>) -> Result<EventSubscription, ChainError>;
}

type Delivery = Result<EventEnvelope, ChainError>;

/// Sequential stream of events. Dropping or closing it cancels the producer.
pub struct EventSubscription {
    receiver: mpsc::Receiver<Delivery>,
}

/// Producer half of an [`EventSubscription`].
#[derive(Clone)]
pub struct EventSink {
    sender: mpsc::Sender<Delivery>,
}

impl EventSubscription {
    pub fn channel(buffer: usize) -> (EventSink, EventSubscription) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (EventSink { sender }, EventSubscription { receiver })
    }

    /// Next delivery, or `None` once the producer has finished.
    pub async fn next(&mut self) -> Option<Delivery> {
        self.receiver.recv().await
    }

    /// Stop accepting deliveries. Already buffered ones can still be drained.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl EventSink {
    /// Deliver an event. Returns `false` once the subscriber is gone.
    pub async fn deliver(&self, envelope: EventEnvelope) -> bool {
        self.sender.send(Ok(envelope)).await.is_ok()
    }

    /// Report a terminal failure; the producer should stop afterwards.
    pub async fn fail(&self, error: ChainError) {
        let _ = self.sender.send(Err(error)).await;
    }

    /// Resolves when the subscriber closes or drops the subscription.
    pub async fn closed(&self) {
        self.sender.closed().await
    }
}
