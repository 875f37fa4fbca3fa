use std::collections::HashMap;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use log::{info, warn};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::{DatabaseConnection, IntoActiveModel, TransactionTrait};

use entity::prelude::Pick;
use entity::{golfer, pick, tournament, user};

use crate::dto::mutation::new_pick;
use crate::dto::{
    GolferOption, PickInput, PickOutcome, PickPage, PickResponse, PickView, PicksToDate,
    PicksToDateRow, TournamentColumn, TournamentView, User,
};
use crate::error::{GenericError, PickError};
use crate::query;

pub fn is_locked(tournament: &tournament::Model, now: DateTime<Utc>) -> bool {
    tournament.lock_at.with_timezone(&Utc) <= now
}

/// Everything the pick form needs: the open tournament, the field with this
/// user's already used golfers flagged, and the current pick.
pub async fn pick_page(
    db: &impl ConnectionTrait,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<PickPage, GenericError> {
    let tournament = query::active_tournament(db).await?;
    let golfers = query::list_golfers(db).await?;

    let (my_pick, used) = match &tournament {
        Some(t) => (
            query::user_pick_in_tournament(db, user_id, t.id).await?,
            query::used_golfer_ids(db, user_id, t.season_id).await?,
        ),
        None => (None, Vec::new()),
    };

    Ok(PickPage {
        tournament: tournament.as_ref().map(|t| TournamentView::new(t, is_locked(t, now))),
        golfers: golfers
            .into_iter()
            .map(|g| GolferOption {
                used: used.contains(&g.id),
                id: g.id,
                name: g.name,
            })
            .collect(),
        my_pick: my_pick.as_ref().map(PickView::from),
    })
}

/// Creates or changes the user's pick for the active tournament.
///
/// The checks run in one transaction with the write. The unique indexes on
/// `pick` still back every rule, and a violation that slips past the checks
/// is reported with the same message.
pub async fn submit_pick(
    db: &DatabaseConnection,
    user_id: i32,
    input: PickInput,
    now: DateTime<Utc>,
) -> Result<PickResponse, GenericError> {
    let txn = db.begin().await?;

    let tournament = query::active_tournament(&txn)
        .await?
        .ok_or(PickError::NoActiveTournament)?;
    let golfer_id = input
        .golfer_id
        .filter(|id| *id > 0)
        .ok_or(PickError::NoGolferSelected)?;
    if is_locked(&tournament, now) {
        return Err(PickError::Locked.into());
    }
    if query::get_golfer(&txn, golfer_id).await?.is_none() {
        return Err(PickError::GolferNotFound.into());
    }

    let existing = query::user_pick_in_tournament(&txn, user_id, tournament.id).await?;
    if let Some(existing) = &existing {
        if existing.golfer_id == golfer_id {
            txn.commit().await?;
            return Ok(response(PickOutcome::Unchanged, existing));
        }
    }

    let used_elsewhere = Pick::find()
        .filter(
            pick::Column::UserId
                .eq(user_id)
                .and(pick::Column::SeasonId.eq(tournament.season_id))
                .and(pick::Column::GolferId.eq(golfer_id))
                .and(pick::Column::TournamentId.ne(tournament.id)),
        )
        .one(&txn)
        .await?;
    if used_elsewhere.is_some() {
        return Err(PickError::AlreadyUsedThisSeason.into());
    }

    let taken = Pick::find()
        .filter(
            pick::Column::TournamentId
                .eq(tournament.id)
                .and(pick::Column::GolferId.eq(golfer_id))
                .and(pick::Column::UserId.ne(user_id)),
        )
        .one(&txn)
        .await?;
    if taken.is_some() {
        return Err(PickError::DoubleBooked.into());
    }

    let (outcome, written) = match existing {
        Some(existing) => {
            let mut active = existing.into_active_model();
            active.golfer_id = Set(golfer_id);
            active.updated_at = Set(now.fixed_offset());
            (PickOutcome::Updated, active.update(&txn).await)
        }
        None => (
            PickOutcome::Saved,
            new_pick(user_id, &tournament, golfer_id, now).insert(&txn).await,
        ),
    };
    let written = written.map_err(|e| match PickError::from_db_err(&e) {
        Some(conflict) => {
            warn!("Pick for user {user_id} hit constraint: {:?}", conflict);
            conflict.into()
        }
        None => GenericError::from(e),
    })?;

    txn.commit().await?;
    info!(
        "User {} {} golfer {} for tournament {}",
        user_id,
        match outcome {
            PickOutcome::Saved => "picked",
            _ => "switched to",
        },
        golfer_id,
        tournament.id
    );
    Ok(response(outcome, &written))
}

/// Every pick made in a season, one row per user and one column per
/// tournament in lock order.
pub async fn season_picks(
    db: &impl ConnectionTrait,
    season_id: i32,
) -> Result<PicksToDate, GenericError> {
    let tournaments = query::tournaments_in_season(db, season_id).await?;
    let picks = query::picks_in_season(db, season_id).await?;
    let users = query::users_by_ids(db, picks.iter().map(|p| p.user_id).unique().collect()).await?;
    let golfers = query::list_golfers(db).await?;
    Ok(picks_grid(season_id, &tournaments, &users, &golfers, &picks))
}

fn picks_grid(
    season_id: i32,
    tournaments: &[tournament::Model],
    users: &[user::Model],
    golfers: &[golfer::Model],
    picks: &[pick::Model],
) -> PicksToDate {
    let names: HashMap<i32, &str> = golfers.iter().map(|g| (g.id, g.name.as_str())).collect();
    let chosen: HashMap<(i32, i32), i32> = picks
        .iter()
        .map(|p| ((p.user_id, p.tournament_id), p.golfer_id))
        .collect();

    let rows = users
        .iter()
        .sorted_by(|a, b| a.email.cmp(&b.email))
        .map(|u| PicksToDateRow {
            user: u.into(),
            picks: tournaments
                .iter()
                .map(|t| {
                    chosen
                        .get(&(u.id, t.id))
                        .and_then(|g| names.get(g))
                        .map(|name| name.to_string())
                })
                .collect(),
        })
        .collect();

    PicksToDate {
        season_id,
        tournaments: tournaments
            .iter()
            .map(|t| TournamentColumn {
                id: t.id,
                name: t.name.clone(),
            })
            .collect(),
        rows,
    }
}

fn response(outcome: PickOutcome, pick: &pick::Model) -> PickResponse {
    PickResponse {
        outcome,
        message: outcome.to_string(),
        pick: pick.into(),
    }
}
