//! Comment entity for SeaORM - composite key (post_id, comment_id).

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mirrorpost_core::domain::{Address, Comment};
use mirrorpost_core::error::RepoError;

use super::{to_i64, to_u64};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub comment_id: i64,
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
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::PostId"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Comment {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            comment_id: to_u64(model.comment_id),
            post_id: to_u64(model.post_id),
            sub_community_id: to_u64(model.sub_community_id),
            author: Address::parse(&model.author)
                .map_err(|e| RepoError::Query(format!("corrupt comment author: {e}")))?,
            username: model.username,
            content: model.content,
            timestamp: to_u64(model.timestamp),
            likes: to_u64(model.likes),
            is_deleted: model.is_deleted,
        })
    }
}

impl From<Comment> for ActiveModel {
    fn from(comment: Comment) -> Self {
        Self {
            post_id: Set(to_i64(comment.post_id)),
            comment_id: Set(to_i64(comment.comment_id)),
            sub_community_id: Set(to_i64(comment.sub_community_id)),
            author: Set(comment.author.into()),
            username: Set(comment.username),
            content: Set(comment.content),
            timestamp: Set(to_i64(comment.timestamp)),
            likes: Set(to_i64(comment.likes)),
            is_deleted: Set(comment.is_deleted),
        }
    }
}
