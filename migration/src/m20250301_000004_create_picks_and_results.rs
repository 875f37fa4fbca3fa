use entity::constraint::*;
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
                    .table(Pick::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pick::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pick::UserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pick::Table, Pick::UserId)
                            .to(User::Table, User::Id),
                    )
                    .col(ColumnDef::new(Pick::TournamentId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pick::Table, Pick::TournamentId)
                            .to(Tournament::Table, Tournament::Id),
                    )
                    .col(ColumnDef::new(Pick::SeasonId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pick::Table, Pick::SeasonId)
                            .to(Season::Table, Season::Id),
                    )
                    .col(ColumnDef::new(Pick::GolferId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pick::Table, Pick::GolferId)
                            .to(Golfer::Table, Golfer::Id),
                    )
                    .col(
                        ColumnDef::new(Pick::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Pick::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .index(
                        Index::create()
                            .name(PICK_ONE_PER_EVENT)
                            .col(Pick::UserId)
                            .col(Pick::TournamentId)
                            .unique(),
                    )
                    .index(
                        Index::create()
                            .name(PICK_NO_REUSE_IN_SEASON)
                            .col(Pick::UserId)
                            .col(Pick::SeasonId)
                            .col(Pick::GolferId)
                            .unique(),
                    )
                    .index(
                        Index::create()
                            .name(PICK_NO_DOUBLE_BOOKING)
                            .col(Pick::TournamentId)
                            .col(Pick::GolferId)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TournamentResult::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TournamentResult::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TournamentResult::TournamentId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TournamentResult::Table, TournamentResult::TournamentId)
                            .to(Tournament::Table, Tournament::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .col(ColumnDef::new(TournamentResult::GolferId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TournamentResult::Table, TournamentResult::GolferId)
                            .to(Golfer::Table, Golfer::Id),
                    )
                    .col(
                        ColumnDef::new(TournamentResult::Earnings)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .index(
                        Index::create()
                            .name("tournament_result_tournament_golfer")
                            .col(TournamentResult::TournamentId)
                            .col(TournamentResult::GolferId)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table!(TournamentResult, manager);
        drop_table!(Pick, manager);
        Ok(())
    }
}
