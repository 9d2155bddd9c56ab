use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // users 表
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::Name).string().not_null())
                    .col(ColumnDef::new(User::Email).string().not_null())
                    .col(ColumnDef::new(User::ExternalAuthId).string().null())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // short_links 表
        manager
            .create_table(
                Table::create()
                    .table(ShortLink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortLink::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShortLink::LongUrl).text().not_null())
                    .col(ColumnDef::new(ShortLink::ShortAlias).string().not_null())
                    .col(ColumnDef::new(ShortLink::Topic).string().null())
                    .col(ColumnDef::new(ShortLink::OwnerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ShortLink::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShortLink::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // short_alias 全局唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_alias")
                    .table(ShortLink::Table)
                    .col(ShortLink::ShortAlias)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_owner")
                    .table(ShortLink::Table)
                    .col(ShortLink::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_topic_owner")
                    .table(ShortLink::Table)
                    .col(ShortLink::Topic)
                    .col(ShortLink::OwnerId)
                    .to_owned(),
            )
            .await?;

        // visit_records 表
        manager
            .create_table(
                Table::create()
                    .table(VisitRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VisitRecord::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VisitRecord::UrlId).big_integer().not_null())
                    .col(ColumnDef::new(VisitRecord::VisitorKey).string().not_null())
                    .col(
                        ColumnDef::new(VisitRecord::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(VisitRecord::OsType).string().not_null())
                    .col(ColumnDef::new(VisitRecord::DeviceType).string().not_null())
                    .col(ColumnDef::new(VisitRecord::IpAddress).string().not_null())
                    .col(ColumnDef::new(VisitRecord::Country).string().not_null())
                    .col(ColumnDef::new(VisitRecord::Region).string().not_null())
                    .col(ColumnDef::new(VisitRecord::City).string().not_null())
                    .col(ColumnDef::new(VisitRecord::Date).date().not_null())
                    .to_owned(),
            )
            .await?;

        // 并发 upsert 的仲裁约束：同一 (url_id, visitor_key, date) 只允许一行
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visit_records_upsert_key")
                    .table(VisitRecord::Table)
                    .col(VisitRecord::UrlId)
                    .col(VisitRecord::VisitorKey)
                    .col(VisitRecord::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visit_records_url")
                    .table(VisitRecord::Table)
                    .col(VisitRecord::UrlId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VisitRecord::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShortLink::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Name,
    Email,
    ExternalAuthId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ShortLink {
    #[sea_orm(iden = "short_links")]
    Table,
    Id,
    LongUrl,
    ShortAlias,
    Topic,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VisitRecord {
    #[sea_orm(iden = "visit_records")]
    Table,
    Id,
    UrlId,
    VisitorKey,
    Clicks,
    OsType,
    DeviceType,
    IpAddress,
    Country,
    Region,
    City,
    Date,
}
