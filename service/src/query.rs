use log::warn;
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;

use entity::prelude::*;
use entity::*;

use crate::error::GenericError;

/// The tournament currently open for picks. More than one active row is a
/// data error; the most recently locking one wins.
pub async fn active_tournament(
    db: &impl ConnectionTrait,
) -> Result<Option<tournament::Model>, GenericError> {
    let mut active = Tournament::find()
        .filter(tournament::Column::IsActive.eq(true))
        .order_by_desc(tournament::Column::LockAt)
        .all(db)
        .await?;
    if active.len() > 1 {
        warn!(
            "{} tournaments are flagged active, using the latest one",
            active.len()
        );
    }
    Ok(if active.is_empty() {
        None
    } else {
        Some(active.remove(0))
    })
}

pub async fn get_tournament(
    db: &impl ConnectionTrait,
    tournament_id: i32,
) -> Result<tournament::Model, GenericError> {
    Tournament::find_by_id(tournament_id)
        .one(db)
        .await?
        .ok_or(GenericError::NotFound("Tournament not found"))
}

pub async fn tournaments_in_season(
    db: &impl ConnectionTrait,
    season_id: i32,
) -> Result<Vec<tournament::Model>, GenericError> {
    Ok(Tournament::find()
        .filter(tournament::Column::SeasonId.eq(season_id))
        .order_by_asc(tournament::Column::LockAt)
        .all(db)
        .await?)
}

pub async fn season_exists(db: &impl ConnectionTrait, season_id: i32) -> Result<bool, GenericError> {
    Ok(Season::find_by_id(season_id).one(db).await?.is_some())
}

pub async fn get_golfer(
    db: &impl ConnectionTrait,
    golfer_id: i32,
) -> Result<Option<golfer::Model>, GenericError> {
    Ok(Golfer::find_by_id(golfer_id).one(db).await?)
}

pub async fn list_golfers(db: &impl ConnectionTrait) -> Result<Vec<golfer::Model>, GenericError> {
    Ok(Golfer::find()
        .order_by_asc(golfer::Column::Name)
        .all(db)
        .await?)
}

pub async fn get_user(
    db: &impl ConnectionTrait,
    user_id: i32,
) -> Result<Option<user::Model>, GenericError> {
    Ok(User::find_by_id(user_id).one(db).await?)
}

pub async fn get_user_by_email(
    db: &impl ConnectionTrait,
    email: &str,
) -> Result<Option<user::Model>, GenericError> {
    Ok(User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn users_by_ids(
    db: &impl ConnectionTrait,
    ids: Vec<i32>,
) -> Result<Vec<user::Model>, GenericError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(User::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?)
}

pub async fn user_pick_in_tournament(
    db: &impl ConnectionTrait,
    user_id: i32,
    tournament_id: i32,
) -> Result<Option<pick::Model>, GenericError> {
    Ok(Pick::find()
        .filter(
            pick::Column::UserId
                .eq(user_id)
                .and(pick::Column::TournamentId.eq(tournament_id)),
        )
        .one(db)
        .await?)
}

/// Golfers this user has picked in the season, in any tournament.
pub async fn used_golfer_ids(
    db: &impl ConnectionTrait,
    user_id: i32,
    season_id: i32,
) -> Result<Vec<i32>, GenericError> {
    Ok(Pick::find()
        .filter(
            pick::Column::UserId
                .eq(user_id)
                .and(pick::Column::SeasonId.eq(season_id)),
        )
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.golfer_id)
        .collect())
}

pub async fn picks_in_season(
    db: &impl ConnectionTrait,
    season_id: i32,
) -> Result<Vec<pick::Model>, GenericError> {
    Ok(Pick::find()
        .filter(pick::Column::SeasonId.eq(season_id))
        .all(db)
        .await?)
}

pub async fn results_for_tournaments(
    db: &impl ConnectionTrait,
    tournament_ids: Vec<i32>,
) -> Result<Vec<tournament_result::Model>, GenericError> {
    if tournament_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(TournamentResult::find()
        .filter(tournament_result::Column::TournamentId.is_in(tournament_ids))
        .all(db)
        .await?)
}
