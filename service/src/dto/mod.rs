pub(crate) mod mutation;

use chrono::{DateTime, FixedOffset};
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use entity::{golfer, golfer_alias, pick, season, tournament, user};

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct MagicLinkRequest {
    pub email: String,
    #[serde(default)]
    pub invite_code: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
pub struct Me {
    pub id: i32,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
pub struct PickInput {
    pub golfer_id: Option<i32>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct TournamentView {
    pub id: i32,
    pub name: String,
    pub season_id: i32,
    pub lock_at: DateTime<FixedOffset>,
    pub locked: bool,
    pub purse: Option<i64>,
}

impl TournamentView {
    pub fn new(t: &tournament::Model, locked: bool) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            season_id: t.season_id,
            lock_at: t.lock_at,
            locked,
            purse: t.purse,
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct GolferOption {
    pub id: i32,
    pub name: String,
    pub used: bool,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct PickView {
    pub id: i32,
    pub tournament_id: i32,
    pub golfer_id: i32,
}

impl From<&pick::Model> for PickView {
    fn from(p: &pick::Model) -> Self {
        Self {
            id: p.id,
            tournament_id: p.tournament_id,
            golfer_id: p.golfer_id,
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
pub struct PickPage {
    pub tournament: Option<TournamentView>,
    pub golfers: Vec<GolferOption>,
    pub my_pick: Option<PickView>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PickOutcome {
    #[strum(serialize = "Pick saved")]
    Saved,
    #[strum(serialize = "Pick updated")]
    Updated,
    #[strum(serialize = "Pick unchanged")]
    Unchanged,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
pub struct PickResponse {
    pub outcome: PickOutcome,
    pub message: String,
    pub pick: PickView,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Golfer {
    pub id: i32,
    pub name: String,
    pub canonical_name: Option<String>,
}

impl From<golfer::Model> for Golfer {
    fn from(g: golfer::Model) -> Self {
        Self {
            id: g.id,
            name: g.name,
            canonical_name: g.canonical_name,
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct GolferWithAliasCount {
    pub id: i32,
    pub display_name: String,
    pub alias_count: usize,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct AliasInput {
    pub alias: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Alias {
    pub id: i32,
    pub golfer_id: i32,
    pub alias: String,
}

impl From<golfer_alias::Model> for Alias {
    fn from(a: golfer_alias::Model) -> Self {
        Self {
            id: a.id,
            golfer_id: a.golfer_id,
            alias: a.alias,
        }
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct CreateSeason {
    pub name: String,
    pub year: i32,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Season {
    pub id: i32,
    pub name: String,
    pub year: i32,
}

impl From<season::Model> for Season {
    fn from(s: season::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
            year: s.year,
        }
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct CreateTournament {
    pub name: String,
    pub season_id: i32,
    pub lock_at: DateTime<FixedOffset>,
    pub purse: Option<i64>,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct CreateGolfer {
    pub name: String,
    pub canonical_name: Option<String>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub email: String,
}

impl From<&user::Model> for User {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Standing {
    pub user: User,
    pub total_earnings: i64,
    pub picks_made: usize,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct LastWeekPick {
    pub user: User,
    pub golfer: String,
    pub earnings: i64,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct LastWeek {
    pub tournament_id: i32,
    pub name: String,
    pub picks: Vec<LastWeekPick>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
pub struct LeagueSummary {
    pub this_week: Option<TournamentView>,
    pub standings: Vec<Standing>,
    pub last_week: Option<LastWeek>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct TournamentColumn {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct PicksToDateRow {
    pub user: User,
    /// One entry per tournament column, the golfer's name or `None` if no pick was made.
    pub picks: Vec<Option<String>>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct PicksToDate {
    pub season_id: i32,
    pub tournaments: Vec<TournamentColumn>,
    pub rows: Vec<PicksToDateRow>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub unmatched: Vec<String>,
}
