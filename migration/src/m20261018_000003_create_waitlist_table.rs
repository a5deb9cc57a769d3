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
                    .table(Waitlists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Waitlists::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Waitlists::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Waitlists::LogoUrl).text().null())
                    .col(ColumnDef::new(Waitlists::LinkUrl).text().not_null())
                    .col(
                        ColumnDef::new(Waitlists::Status)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Waitlists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_waitlists_created_at")
                    .table(Waitlists::Table)
                    .col(Waitlists::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Waitlists::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Waitlists {
    Table,
    Id,
    Name,
    LogoUrl,
    LinkUrl,
    Status,
    CreatedAt,
}
