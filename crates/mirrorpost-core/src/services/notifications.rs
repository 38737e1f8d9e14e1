use crate::domain::{Activity, Address, Notification, NotificationKind};
use crate::error::DomainError;
use crate::ports::Repositories;

#[derive(Clone)]
pub struct NotificationService {
    repos: Repositories,
}

impl NotificationService {
    /// How many notifications a recipient listing returns.
    pub const PAGE_SIZE: u64 = 50;

    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Record activity for the content owner; self-activity produces nothing.
    pub async fn notify(
        &self,
        kind: NotificationKind,
        activity: Activity,
    ) -> Result<Option<Notification>, DomainError> {
        let Some(notification) = Notification::for_activity(kind, activity) else {
            return Ok(None);
        };

        let inserted = self.repos.notifications.insert(notification.clone()).await?;
        if inserted {
            tracing::debug!(
                recipient = %notification.user_address,
                kind = %notification.kind,
                "Notification recorded"
            );
        }
        Ok(Some(notification))
    }

    /// Explicit creation through the write API.
    pub async fn create(
        &self,
        kind: NotificationKind,
        activity: Activity,
    ) -> Result<Notification, DomainError> {
        self.notify(kind, activity).await?.ok_or_else(|| {
            DomainError::Validation("actor cannot be notified about their own activity".into())
        })
    }

    pub async fn list(&self, recipient: &Address) -> Result<Vec<Notification>, DomainError> {
        Ok(self
            .repos
            .notifications
            .find_for_recipient(recipient, Self::PAGE_SIZE)
            .await?)
    }

    pub async fn mark_read(&self, recipient: &Address) -> Result<u64, DomainError> {
        Ok(self.repos.notifications.mark_all_read(recipient).await?)
    }
}
