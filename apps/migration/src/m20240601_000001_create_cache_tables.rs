use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::PostId).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(Posts::SubCommunityId).big_integer().not_null())
                    .col(ColumnDef::new(Posts::Author).string().not_null())
                    .col(ColumnDef::new(Posts::Username).string().not_null())
                    .col(ColumnDef::new(Posts::Content).text().not_null())
                    .col(ColumnDef::new(Posts::Timestamp).big_integer().not_null())
                    .col(ColumnDef::new(Posts::Likes).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Posts::IsDeleted).boolean().not_null().default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_sub_community_id")
                    .table(Posts::Table)
                    .col(Posts::SubCommunityId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // No foreign key to posts: a comment may be replicated before its post.
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::PostId).big_integer().not_null())
                    .col(ColumnDef::new(Comments::CommentId).big_integer().not_null())
                    .col(ColumnDef::new(Comments::SubCommunityId).big_integer().not_null())
                    .col(ColumnDef::new(Comments::Author).string().not_null())
                    .col(ColumnDef::new(Comments::Username).string().not_null())
                    .col(ColumnDef::new(Comments::Content).text().not_null())
                    .col(ColumnDef::new(Comments::Timestamp).big_integer().not_null())
                    .col(ColumnDef::new(Comments::Likes).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Comments::IsDeleted).boolean().not_null().default(false))
                    .primary_key(Index::create().col(Comments::PostId).col(Comments::CommentId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubCommunities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubCommunities::SubCommunityId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubCommunities::Name).string_len(50).not_null())
                    .col(ColumnDef::new(SubCommunities::Description).string_len(200).not_null())
                    .col(ColumnDef::new(SubCommunities::Creator).string().not_null())
                    .col(
                        ColumnDef::new(SubCommunities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Address).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Not unique: the contract owns uniqueness and replays may briefly overlap.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_username")
                    .table(Users::Table)
                    .col(Users::Username)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notifications::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notifications::UserAddress).string().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(ColumnDef::new(Notifications::PostId).big_integer())
                    .col(ColumnDef::new(Notifications::CommentId).big_integer())
                    .col(ColumnDef::new(Notifications::Actor).string().not_null())
                    .col(ColumnDef::new(Notifications::ActorUsername).string())
                    .col(ColumnDef::new(Notifications::Timestamp).big_integer().not_null())
                    .col(ColumnDef::new(Notifications::Read).boolean().not_null().default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_address")
                    .table(Notifications::Table)
                    .col(Notifications::UserAddress)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubCommunities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    PostId,
    SubCommunityId,
    Author,
    Username,
    Content,
    Timestamp,
    Likes,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    PostId,
    CommentId,
    SubCommunityId,
    Author,
    Username,
    Content,
    Timestamp,
    Likes,
    IsDeleted,
}

#[derive(DeriveIden)]
enum SubCommunities {
    Table,
    SubCommunityId,
    Name,
    Description,
    Creator,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Address,
    Username,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserAddress,
    Kind,
    PostId,
    CommentId,
    Actor,
    ActorUsername,
    Timestamp,
    Read,
}
