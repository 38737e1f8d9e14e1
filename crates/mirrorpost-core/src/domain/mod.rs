//! Domain entities - the cached projection of MirrorPost contract state.

mod address;
mod comment;
mod event;
mod notification;
mod post;
mod sub_community;
mod user;

pub use address::Address;
pub use comment::{Comment, CommentKey};
pub use event::{ChainEvent, EventCursor, EventEnvelope};
pub use notification::{Activity, Notification, NotificationKind};
pub use post::{Post, PostId};
pub use sub_community::{SubCommunity, SubCommunityId};
pub use user::User;

use crate::error::DomainError;

/// Character-count bounds check shared by the entity validators.
pub(crate) fn check_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(DomainError::Validation(format!(
            "{field} must be {min}-{max} characters"
        )));
    }
    Ok(())
}
