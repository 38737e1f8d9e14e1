//! SubCommunity entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mirrorpost_core::domain::{Address, SubCommunity};
use mirrorpost_core::error::RepoError;

use super::{to_i64, to_u64};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sub_communities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sub_community_id: i64,
    pub name: String,
    pub description: String,
    pub creator: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for SubCommunity {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            sub_community_id: to_u64(model.sub_community_id),
            name: model.name,
            description: model.description,
            creator: Address::parse(&model.creator)
                .map_err(|e| RepoError::Query(format!("corrupt creator: {e}")))?,
            created_at: model.created_at.into(),
        })
    }
}

impl From<SubCommunity> for ActiveModel {
    fn from(sub_community: SubCommunity) -> Self {
        Self {
            sub_community_id: Set(to_i64(sub_community.sub_community_id)),
            name: Set(sub_community.name),
            description: Set(sub_community.description),
            creator: Set(sub_community.creator.into()),
            created_at: Set(sub_community.created_at.into()),
        }
    }
}
