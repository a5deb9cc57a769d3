use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Airdrops::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Airdrops::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Airdrops::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Airdrops::XHandle).string_len(512).not_null())
                    .col(ColumnDef::new(Airdrops::WebsiteUrl).text().not_null())
                    .col(ColumnDef::new(Airdrops::Info).text().not_null())
                    .col(ColumnDef::new(Airdrops::LogoUrl).text().null())
                    .col(
                        ColumnDef::new(Airdrops::Status)
                            .string_len(16)
                            .not_null()
                            .default("NOT_FINISHED"),
                    )
                    .col(
                        ColumnDef::new(Airdrops::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing is always newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_airdrops_created_at")
                    .table(Airdrops::Table)
                    .col(Airdrops::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::Title).string_len(512).not_null())
                    .col(
                        ColumnDef::new(Tasks::Done)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tasks::AirdropId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_airdrop")
                            .from(Tasks::Table, Tasks::AirdropId)
                            .to(Airdrops::Table, Airdrops::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_airdrop_id")
                    .table(Tasks::Table)
                    .col(Tasks::AirdropId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Airdrops::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Airdrops {
    Table,
    Id,
    Name,
    XHandle,
    WebsiteUrl,
    Info,
    LogoUrl,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Done,
    AirdropId,
}
