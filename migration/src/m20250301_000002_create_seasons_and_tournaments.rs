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
                    .table(Season::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Season::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Season::Name).string().unique_key().not_null())
                    .col(ColumnDef::new(Season::Year).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tournament::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tournament::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tournament::Name).string().not_null())
                    .col(ColumnDef::new(Tournament::SeasonId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tournament::Table, Tournament::SeasonId)
                            .to(Season::Table, Season::Id),
                    )
                    .col(
                        ColumnDef::new(Tournament::LockAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tournament::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tournament::Purse).big_integer())
                    .index(
                        Index::create()
                            .name("tournament_season_name")
                            .col(Tournament::SeasonId)
                            .col(Tournament::Name)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table!(Tournament, manager);
        drop_table!(Season, manager);
        Ok(())
    }
}
