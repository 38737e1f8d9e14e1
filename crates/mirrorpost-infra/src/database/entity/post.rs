//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mirrorpost_core::domain::{Address, Post};
use mirrorpost_core::error::RepoError;

use super::{to_i64, to_u64};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: i64,
    pub sub_community_id: i64,
    pub author: String,
    pub username: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub timestamp: i64,
    pub likes: i64,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl TryFrom<Model> for Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            post_id: to_u64(model.post_id),
            sub_community_id: to_u64(model.sub_community_id),
            author: Address::parse(&model.author)
                .map_err(|e| RepoError::Query(format!("corrupt post author: {e}")))?,
            username: model.username,
            content: model.content,
            timestamp: to_u64(model.timestamp),
            likes: to_u64(model.likes),
            is_deleted: model.is_deleted,
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            post_id: Set(to_i64(post.post_id)),
            sub_community_id: Set(to_i64(post.sub_community_id)),
            author: Set(post.author.into()),
            username: Set(post.username),
            content: Set(post.content),
            timestamp: Set(to_i64(post.timestamp)),
            likes: Set(to_i64(post.likes)),
            is_deleted: Set(post.is_deleted),
        }
    }
}
