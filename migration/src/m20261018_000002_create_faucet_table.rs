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
                    .table(Faucets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Faucets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Faucets::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Faucets::LogoUrl).text().null())
                    .col(ColumnDef::new(Faucets::LinkUrl).text().not_null())
                    .col(
                        ColumnDef::new(Faucets::Status)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Faucets::CreatedAt)
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
                    .name("idx_faucets_created_at")
                    .table(Faucets::Table)
                    .col(Faucets::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Faucets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Faucets {
    Table,
    Id,
    Name,
    LogoUrl,
    LinkUrl,
    Status,
    CreatedAt,
}
