use std::collections::HashMap;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;

use entity::prelude::{Pick, Tournament};
use entity::{golfer, pick, tournament, tournament_result, user};

use crate::dto::{LastWeek, LastWeekPick, LeagueSummary, Standing, TournamentView};
use crate::error::GenericError;
use crate::picks::is_locked;
use crate::query;

fn earnings_by_pick(
    results: &[tournament_result::Model],
) -> HashMap<(i32, i32), i64> {
    results
        .iter()
        .map(|r| ((r.tournament_id, r.golfer_id), r.earnings))
        .collect()
}

/// Sums what each user's golfers earned. Users without picks are left out.
pub fn tally_standings(
    users: &[user::Model],
    picks: &[pick::Model],
    results: &[tournament_result::Model],
) -> Vec<Standing> {
    let earnings = earnings_by_pick(results);
    let by_user = picks.iter().into_group_map_by(|p| p.user_id);

    users
        .iter()
        .filter_map(|u| {
            let picks = by_user.get(&u.id)?;
            Some(Standing {
                user: u.into(),
                total_earnings: picks
                    .iter()
                    .filter_map(|p| earnings.get(&(p.tournament_id, p.golfer_id)))
                    .sum(),
                picks_made: picks.len(),
            })
        })
        .sorted_by(|a, b| {
            b.total_earnings
                .cmp(&a.total_earnings)
                .then_with(|| a.user.email.cmp(&b.user.email))
        })
        .collect()
}

pub async fn standings(
    db: &impl ConnectionTrait,
    season_id: i32,
) -> Result<Vec<Standing>, GenericError> {
    let picks = query::picks_in_season(db, season_id).await?;
    let users = query::users_by_ids(db, picks.iter().map(|p| p.user_id).unique().collect()).await?;
    let results =
        query::results_for_tournaments(db, picks.iter().map(|p| p.tournament_id).unique().collect())
            .await?;
    Ok(tally_standings(&users, &picks, &results))
}

/// The most recent tournament that locked before `before`.
/// Last week locked before the active tournament, and never after `now`.
pub fn last_week_cutoff(active: Option<&tournament::Model>, now: DateTime<Utc>) -> DateTime<Utc> {
    active
        .map(|t| t.lock_at.with_timezone(&Utc))
        .map_or(now, |lock_at| lock_at.min(now))
}

async fn previous_tournament(
    db: &impl ConnectionTrait,
    before: DateTime<Utc>,
) -> Result<Option<tournament::Model>, GenericError> {
    Ok(Tournament::find()
        .filter(tournament::Column::LockAt.lt(before.fixed_offset()))
        .order_by_desc(tournament::Column::LockAt)
        .one(db)
        .await?)
}

fn last_week_picks(
    users: &[user::Model],
    golfers: &[golfer::Model],
    picks: &[pick::Model],
    results: &[tournament_result::Model],
) -> Vec<LastWeekPick> {
    let earnings = earnings_by_pick(results);
    let users: HashMap<i32, &user::Model> = users.iter().map(|u| (u.id, u)).collect();
    let golfers: HashMap<i32, &golfer::Model> = golfers.iter().map(|g| (g.id, g)).collect();

    picks
        .iter()
        .filter_map(|p| {
            Some(LastWeekPick {
                user: (*users.get(&p.user_id)?).into(),
                golfer: golfers.get(&p.golfer_id)?.name.clone(),
                earnings: earnings
                    .get(&(p.tournament_id, p.golfer_id))
                    .copied()
                    .unwrap_or(0),
            })
        })
        .sorted_by(|a, b| {
            b.earnings
                .cmp(&a.earnings)
                .then_with(|| a.user.email.cmp(&b.user.email))
        })
        .collect()
}

async fn last_week(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
) -> Result<LastWeek, GenericError> {
    let picks = Pick::find()
        .filter(pick::Column::TournamentId.eq(tournament.id))
        .all(db)
        .await?;
    let users = query::users_by_ids(db, picks.iter().map(|p| p.user_id).unique().collect()).await?;
    let results = query::results_for_tournaments(db, vec![tournament.id]).await?;
    let golfers = query::list_golfers(db).await?;

    Ok(LastWeek {
        tournament_id: tournament.id,
        name: tournament.name.clone(),
        picks: last_week_picks(&users, &golfers, &picks, &results),
    })
}

/// The league home page: the open tournament, the season table and how
/// everyone did last week.
pub async fn summary(
    db: &impl ConnectionTrait,
    now: DateTime<Utc>,
) -> Result<LeagueSummary, GenericError> {
    let active = query::active_tournament(db).await?;
    let previous = previous_tournament(db, last_week_cutoff(active.as_ref(), now)).await?;

    let season_id = active.as_ref().or(previous.as_ref()).map(|t| t.season_id);
    let standings = match season_id {
        Some(season_id) => standings(db, season_id).await?,
        None => Vec::new(),
    };
    let last_week = match &previous {
        Some(t) => Some(last_week(db, t).await?),
        None => None,
    };

    Ok(LeagueSummary {
        this_week: active.as_ref().map(|t| TournamentView::new(t, is_locked(t, now))),
        standings,
        last_week,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::User;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn member(id: i32, email: &str) -> user::Model {
        user::Model {
            id,
            email: email.to_string(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn pick(user_id: i32, tournament_id: i32, golfer_id: i32) -> pick::Model {
        pick::Model {
            id: user_id * 100 + tournament_id,
            user_id,
            tournament_id,
            season_id: 1,
            golfer_id,
            created_at: Utc::now().fixed_offset(),
            updated_at: Utc::now().fixed_offset(),
        }
    }

    fn result(tournament_id: i32, golfer_id: i32, earnings: i64) -> tournament_result::Model {
        tournament_result::Model {
            id: tournament_id * 100 + golfer_id,
            tournament_id,
            golfer_id,
            earnings,
        }
    }

    fn tournament(id: i32, lock_in: Duration, active: bool) -> tournament::Model {
        tournament::Model {
            id,
            name: format!("Event {id}"),
            season_id: 1,
            lock_at: (Utc::now() + lock_in).fixed_offset(),
            is_active: active,
            purse: Some(20_000_000),
        }
    }

    #[test]
    fn standings_sum_earnings_and_break_ties_by_email() {
        let users = vec![
            member(1, "carl@example.com"),
            member(2, "anna@example.com"),
            member(3, "bo@example.com"),
            member(4, "idle@example.com"),
        ];
        let picks = vec![
            pick(1, 10, 100),
            pick(1, 11, 101),
            pick(2, 10, 102),
            pick(3, 10, 103),
            pick(3, 11, 104),
        ];
        let results = vec![
            result(10, 100, 500),
            result(11, 101, 500),
            result(10, 102, 1000),
            result(10, 103, 2000),
        ];

        let table = tally_standings(&users, &picks, &results);
        let order = table.iter().map(|s| s.user.id).collect_vec();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(table[0].total_earnings, 2000);
        assert_eq!(table[0].picks_made, 2);
        assert_eq!(table[1].total_earnings, table[2].total_earnings);
    }

    #[test]
    fn last_week_never_includes_unlocked_tournaments() {
        let now = Utc::now();
        let upcoming = tournament(2, Duration::days(2), true);
        assert_eq!(last_week_cutoff(Some(&upcoming), now), now);

        let in_play = tournament(2, -Duration::hours(3), true);
        assert_eq!(
            last_week_cutoff(Some(&in_play), now),
            in_play.lock_at.with_timezone(&Utc)
        );

        assert_eq!(last_week_cutoff(None, now), now);
    }

    #[tokio::test]
    async fn summary_without_tournaments_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<tournament::Model>::new()])
            .append_query_results([Vec::<tournament::Model>::new()])
            .into_connection();

        let summary = summary(&db, Utc::now()).await.unwrap();
        assert!(summary.this_week.is_none());
        assert!(summary.standings.is_empty());
        assert!(summary.last_week.is_none());
    }

    #[tokio::test]
    async fn summary_reports_last_weeks_picks() {
        let this_week = tournament(2, Duration::days(2), true);
        let previous = tournament(1, -Duration::days(5), false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![this_week]])
            .append_query_results([vec![previous]])
            // season standings
            .append_query_results([vec![pick(7, 1, 30)]])
            .append_query_results([vec![member(7, "amy@example.com")]])
            .append_query_results([vec![result(1, 30, 750_000)]])
            // last week
            .append_query_results([vec![pick(7, 1, 30)]])
            .append_query_results([vec![member(7, "amy@example.com")]])
            .append_query_results([vec![result(1, 30, 750_000)]])
            .append_query_results([vec![golfer::Model {
                id: 30,
                name: "Xander Schauffele".to_string(),
                canonical_name: None,
            }]])
            .into_connection();

        let summary = summary(&db, Utc::now()).await.unwrap();
        let this_week = summary.this_week.unwrap();
        assert_eq!(this_week.id, 2);
        assert!(!this_week.locked);
        assert_eq!(summary.standings[0].total_earnings, 750_000);
        assert_eq!(
            summary.last_week,
            Some(LastWeek {
                tournament_id: 1,
                name: "Event 1".to_string(),
                picks: vec![LastWeekPick {
                    user: User {
                        id: 7,
                        email: "amy@example.com".to_string()
                    },
                    golfer: "Xander Schauffele".to_string(),
                    earnings: 750_000,
                }],
            })
        );
    }
}
