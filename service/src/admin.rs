use chrono::{DateTime, Utc};
use log::info;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{DatabaseConnection, IntoActiveModel, TransactionTrait};

use entity::prelude::Tournament;
use entity::{golfer, season, tournament};

use crate::dto::{CreateGolfer, CreateSeason, CreateTournament, TournamentView};
use crate::error::GenericError;
use crate::picks::is_locked;
use crate::query;

pub async fn create_season(
    db: &impl ConnectionTrait,
    input: CreateSeason,
) -> Result<season::Model, GenericError> {
    if input.name.trim().is_empty() {
        return Err(GenericError::BadRequest("Season name cannot be empty"));
    }
    let season = input
        .into_active_model()
        .insert(db)
        .await
        .map_err(|e| GenericError::conflict_or_unknown(e, "Season already exists"))?;
    info!("Created season {} ({})", season.name, season.id);
    Ok(season)
}

pub async fn create_tournament(
    db: &impl ConnectionTrait,
    input: CreateTournament,
    now: DateTime<Utc>,
) -> Result<TournamentView, GenericError> {
    if input.name.trim().is_empty() {
        return Err(GenericError::BadRequest("Tournament name cannot be empty"));
    }
    if !query::season_exists(db, input.season_id).await? {
        return Err(GenericError::NotFound("Season not found"));
    }
    let tournament = input
        .into_active_model()
        .insert(db)
        .await
        .map_err(|e| {
            GenericError::conflict_or_unknown(e, "A tournament with that name exists this season")
        })?;
    info!("Created tournament {} ({})", tournament.name, tournament.id);
    Ok(TournamentView::new(&tournament, is_locked(&tournament, now)))
}

/// Makes one tournament the open one. Every other tournament is deactivated in
/// the same transaction.
pub async fn activate_tournament(
    db: &DatabaseConnection,
    tournament_id: i32,
    now: DateTime<Utc>,
) -> Result<TournamentView, GenericError> {
    let txn = db.begin().await?;
    let tournament = query::get_tournament(&txn, tournament_id).await?;

    Tournament::update_many()
        .col_expr(tournament::Column::IsActive, Expr::value(false))
        .filter(
            tournament::Column::IsActive
                .eq(true)
                .and(tournament::Column::Id.ne(tournament.id)),
        )
        .exec(&txn)
        .await?;

    let tournament = if tournament.is_active {
        tournament
    } else {
        let mut active = tournament.into_active_model();
        active.is_active = Set(true);
        active.update(&txn).await?
    };
    txn.commit().await?;

    info!("Tournament {} is now open for picks", tournament.name);
    Ok(TournamentView::new(&tournament, is_locked(&tournament, now)))
}

pub async fn create_golfer(
    db: &impl ConnectionTrait,
    input: CreateGolfer,
) -> Result<golfer::Model, GenericError> {
    if input.name.trim().is_empty() {
        return Err(GenericError::BadRequest("Golfer name cannot be empty"));
    }
    let golfer = input
        .into_active_model()
        .insert(db)
        .await
        .map_err(|e| GenericError::conflict_or_unknown(e, "Golfer already exists"))?;
    info!("Created golfer {} ({})", golfer.name, golfer.id);
    Ok(golfer)
}
