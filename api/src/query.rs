use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, State};
use rocket_okapi::openapi;
use sea_orm::DatabaseConnection;

use service::dto::{
    Alias, Golfer, GolferWithAliasCount, LeagueSummary, PickPage, PicksToDate, Standing,
    TournamentView,
};
use service::error::GenericError;
use service::{alias, league, picks, query};

use crate::authenticate::{AdminUser, UserAuthentication};

/// # Pick form
///
/// The open tournament, every golfer with the ones you already used this
/// season flagged, and your current pick.
#[openapi(tag = "Picks")]
#[get("/pick")]
pub(crate) async fn get_pick_page(
    db: &State<DatabaseConnection>,
    user: UserAuthentication,
) -> Result<Json<PickPage>, GenericError> {
    Ok(Json(picks::pick_page(db.inner(), user.id(), Utc::now()).await?))
}

#[openapi(tag = "Picks")]
#[get("/tournament/active")]
pub(crate) async fn get_active_tournament(
    db: &State<DatabaseConnection>,
    _user: UserAuthentication,
) -> Result<Json<Option<TournamentView>>, GenericError> {
    let now = Utc::now();
    Ok(Json(
        query::active_tournament(db.inner())
            .await?
            .map(|t| TournamentView::new(&t, picks::is_locked(&t, now))),
    ))
}

#[openapi(tag = "Golfers")]
#[get("/golfers")]
pub(crate) async fn get_golfers(
    db: &State<DatabaseConnection>,
    _user: UserAuthentication,
) -> Result<Json<Vec<Golfer>>, GenericError> {
    Ok(Json(
        query::list_golfers(db.inner())
            .await?
            .into_iter()
            .map(Golfer::from)
            .collect(),
    ))
}

/// # Resolve a golfer name
///
/// Matches free text against canonical names, names and aliases.
#[openapi(tag = "Golfers")]
#[get("/golfers/resolve?<name>")]
pub(crate) async fn resolve_golfer(
    name: &str,
    db: &State<DatabaseConnection>,
    _user: UserAuthentication,
) -> Result<Json<Golfer>, GenericError> {
    alias::resolve(db.inner(), name)
        .await?
        .map(|g| Json(g.into()))
        .ok_or(GenericError::NotFound("No golfer matches that name"))
}

#[openapi(tag = "League")]
#[get("/summary")]
pub(crate) async fn get_summary(
    db: &State<DatabaseConnection>,
    _user: UserAuthentication,
) -> Result<Json<LeagueSummary>, GenericError> {
    Ok(Json(league::summary(db.inner(), Utc::now()).await?))
}

#[openapi(tag = "League")]
#[get("/season/<season_id>/standings")]
pub(crate) async fn get_standings(
    season_id: i32,
    db: &State<DatabaseConnection>,
    _user: UserAuthentication,
) -> Result<Json<Vec<Standing>>, GenericError> {
    Ok(Json(league::standings(db.inner(), season_id).await?))
}

/// # Picks to date
///
/// Every pick made this season as a user by tournament grid.
#[openapi(tag = "League")]
#[get("/season/<season_id>/picks")]
pub(crate) async fn get_season_picks(
    season_id: i32,
    db: &State<DatabaseConnection>,
    _user: UserAuthentication,
) -> Result<Json<PicksToDate>, GenericError> {
    Ok(Json(picks::season_picks(db.inner(), season_id).await?))
}

#[openapi(tag = "Admin")]
#[get("/admin/golfers")]
pub(crate) async fn get_golfers_with_aliases(
    db: &State<DatabaseConnection>,
    _admin: AdminUser,
) -> Result<Json<Vec<GolferWithAliasCount>>, GenericError> {
    Ok(Json(alias::golfers_with_alias_counts(db.inner()).await?))
}

#[openapi(tag = "Admin")]
#[get("/admin/golfers/<golfer_id>/aliases")]
pub(crate) async fn get_aliases(
    golfer_id: i32,
    db: &State<DatabaseConnection>,
    _admin: AdminUser,
) -> Result<Json<Vec<Alias>>, GenericError> {
    Ok(Json(alias::aliases_for(db.inner(), golfer_id).await?))
}
