use entity::constraint::GOLFER_ALIAS_KEY;
use crate::drop_table;
use crate::enums::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Golfer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Golfer::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Golfer::Name).string().unique_key().not_null())
                    .col(ColumnDef::new(Golfer::CanonicalName).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GolferAlias::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GolferAlias::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GolferAlias::GolferId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(GolferAlias::Table, GolferAlias::GolferId)
                            .to(Golfer::Table, Golfer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .col(ColumnDef::new(GolferAlias::Alias).string().not_null())
                    .col(ColumnDef::new(GolferAlias::AliasKey).string().not_null())
                    .index(
                        Index::create()
                            .name(GOLFER_ALIAS_KEY)
                            .col(GolferAlias::AliasKey)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table!(GolferAlias, manager);
        drop_table!(Golfer, manager);
        Ok(())
    }
}
