use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{delete, post, put, State};
use rocket_okapi::openapi;
use sea_orm::DatabaseConnection;

use service::dto::{
    Alias, AliasInput, CreateGolfer, CreateSeason, CreateTournament, Golfer, PickInput,
    PickResponse, Season, TournamentView,
};
use service::error::GenericError;
use service::{admin, alias, picks};

use crate::authenticate::{AdminUser, UserAuthentication};

/// # Save your pick
///
/// Creates or changes your pick for the open tournament.
///
/// # Errors
///
/// - 404 when no tournament is open or the golfer does not exist
///
/// - 400 when no golfer was chosen
///
/// - 403 once the tournament has locked
///
/// - 409 when you used the golfer earlier this season or someone else has
///   picked them this week
#[openapi(tag = "Picks")]
#[put("/pick", format = "json", data = "<pick>")]
pub(crate) async fn submit_pick(
    pick: Json<PickInput>,
    db: &State<DatabaseConnection>,
    user: UserAuthentication,
) -> Result<Json<PickResponse>, GenericError> {
    Ok(Json(
        picks::submit_pick(db.inner(), user.id(), pick.into_inner(), Utc::now()).await?,
    ))
}

#[openapi(tag = "Admin")]
#[post("/admin/golfers/<golfer_id>/aliases", format = "json", data = "<input>")]
pub(crate) async fn add_alias(
    golfer_id: i32,
    input: Json<AliasInput>,
    db: &State<DatabaseConnection>,
    _admin: AdminUser,
) -> Result<Json<Alias>, GenericError> {
    Ok(Json(
        alias::add_alias(db.inner(), golfer_id, input.into_inner()).await?,
    ))
}

#[openapi(tag = "Admin")]
#[delete("/admin/aliases/<alias_id>")]
pub(crate) async fn remove_alias(
    alias_id: i32,
    db: &State<DatabaseConnection>,
    _admin: AdminUser,
) -> Result<&'static str, GenericError> {
    alias::remove_alias(db.inner(), alias_id).await?;
    Ok("Alias removed")
}

#[openapi(tag = "Admin")]
#[post("/admin/seasons", format = "json", data = "<season>")]
pub(crate) async fn create_season(
    season: Json<CreateSeason>,
    db: &State<DatabaseConnection>,
    _admin: AdminUser,
) -> Result<Json<Season>, GenericError> {
    Ok(Json(
        admin::create_season(db.inner(), season.into_inner())
            .await?
            .into(),
    ))
}

#[openapi(tag = "Admin")]
#[post("/admin/tournaments", format = "json", data = "<tournament>")]
pub(crate) async fn create_tournament(
    tournament: Json<CreateTournament>,
    db: &State<DatabaseConnection>,
    _admin: AdminUser,
) -> Result<Json<TournamentView>, GenericError> {
    Ok(Json(
        admin::create_tournament(db.inner(), tournament.into_inner(), Utc::now()).await?,
    ))
}

/// # Open a tournament for picks
///
/// Every other tournament is closed at the same time.
#[openapi(tag = "Admin")]
#[post("/admin/tournaments/<tournament_id>/activate")]
pub(crate) async fn activate_tournament(
    tournament_id: i32,
    db: &State<DatabaseConnection>,
    _admin: AdminUser,
) -> Result<Json<TournamentView>, GenericError> {
    Ok(Json(
        admin::activate_tournament(db.inner(), tournament_id, Utc::now()).await?,
    ))
}

#[openapi(tag = "Admin")]
#[post("/admin/golfers", format = "json", data = "<golfer>")]
pub(crate) async fn create_golfer(
    golfer: Json<CreateGolfer>,
    db: &State<DatabaseConnection>,
    _admin: AdminUser,
) -> Result<Json<Golfer>, GenericError> {
    Ok(Json(
        admin::create_golfer(db.inner(), golfer.into_inner())
            .await?
            .into(),
    ))
}
