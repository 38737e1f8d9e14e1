//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mirrorpost_core::domain::{Address, User};
use mirrorpost_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub address: String,
    #[sea_orm(indexed)]
    pub username: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl TryFrom<Model> for User {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            address: Address::parse(&model.address)
                .map_err(|e| RepoError::Query(format!("corrupt user address: {e}")))?,
            username: model.username,
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        Self {
            address: Set(user.address.into()),
            username: Set(user.username),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
