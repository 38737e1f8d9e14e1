//! Notification entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mirrorpost_core::domain::{Address, Notification};
use mirrorpost_core::error::RepoError;

use super::{to_i64, to_u64};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub user_address: String,
    pub kind: String,
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
    pub actor: String,
    pub actor_username: Option<String>,
    pub timestamp: i64,
    pub read: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Notification {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let corrupt = |e: mirrorpost_core::DomainError| RepoError::Query(format!("corrupt notification: {e}"));
        Ok(Self {
            id: model.id,
            user_address: Address::parse(&model.user_address).map_err(corrupt)?,
            kind: model.kind.parse().map_err(corrupt)?,
            post_id: model.post_id.map(to_u64),
            comment_id: model.comment_id.map(to_u64),
            actor: Address::parse(&model.actor).map_err(corrupt)?,
            actor_username: model.actor_username,
            timestamp: to_u64(model.timestamp),
            read: model.read,
        })
    }
}

impl From<Notification> for ActiveModel {
    fn from(notification: Notification) -> Self {
        Self {
            id: Set(notification.id),
            user_address: Set(notification.user_address.into()),
            kind: Set(notification.kind.as_str().to_string()),
            post_id: Set(notification.post_id.map(to_i64)),
            comment_id: Set(notification.comment_id.map(to_i64)),
            actor: Set(notification.actor.into()),
            actor_username: Set(notification.actor_username),
            timestamp: Set(to_i64(notification.timestamp)),
            read: Set(notification.read),
        }
    }
}
