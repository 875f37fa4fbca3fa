use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};

use entity::{golfer, pick, season, tournament};

use super::*;

impl CreateSeason {
    pub fn into_active_model(self) -> season::ActiveModel {
        season::ActiveModel {
            id: NotSet,
            name: Set(self.name.trim().to_string()),
            year: Set(self.year),
        }
    }
}

impl CreateTournament {
    pub fn into_active_model(self) -> tournament::ActiveModel {
        tournament::ActiveModel {
            id: NotSet,
            name: Set(self.name.trim().to_string()),
            season_id: Set(self.season_id),
            lock_at: Set(self.lock_at),
            is_active: Set(false),
            purse: Set(self.purse),
        }
    }
}

impl CreateGolfer {
    pub fn into_active_model(self) -> golfer::ActiveModel {
        golfer::ActiveModel {
            id: NotSet,
            name: Set(self.name.trim().to_string()),
            canonical_name: Set(self
                .canonical_name
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())),
        }
    }
}

/// A new pick. The season is taken from the tournament so it can never
/// disagree with it.
pub(crate) fn new_pick(
    user_id: i32,
    tournament: &tournament::Model,
    golfer_id: i32,
    now: DateTime<Utc>,
) -> pick::ActiveModel {
    pick::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        tournament_id: Set(tournament.id),
        season_id: Set(tournament.season_id),
        golfer_id: Set(golfer_id),
        created_at: Set(now.fixed_offset()),
        updated_at: Set(now.fixed_offset()),
    }
}
