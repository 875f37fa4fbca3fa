//! Tournament results imported from a CSV export.

use std::collections::BTreeMap;
use std::io::Read;

use itertools::Itertools;
use log::{info, warn};
use rocket::http::Status;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use thiserror::Error;

use entity::prelude::{Golfer, GolferAlias, TournamentResult};
use entity::{golfer, golfer_alias, tournament_result};

use crate::alias::resolve_in;
use crate::dto::ImportSummary;
use crate::error::GenericError;
use crate::query;

/// Largest amount accepted for a single row, in whole dollars.
pub const MAX_EARNINGS: i64 = 1_000_000_000_000;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Could not read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {row}: {value:?} is not an amount")]
    Money { row: usize, value: String },
    #[error("Earnings for {0} add up to more than can be stored")]
    Overflow(String),
    #[error(transparent)]
    Service(#[from] GenericError),
}

impl ImportError {
    pub fn status(&self) -> Status {
        match self {
            Self::Service(e) => e.status(),
            _ => Status::BadRequest,
        }
    }
}

impl From<DbErr> for ImportError {
    fn from(e: DbErr) -> Self {
        Self::Service(e.into())
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "name", alias = "player")]
    golfer: String,
    #[serde(alias = "money", alias = "winnings", default)]
    earnings: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub golfer: String,
    pub earnings: i64,
}

/// Whole dollars from "$1,234,567", "1234567.49" or "". Blank means no money.
/// Negative amounts and amounts above [`MAX_EARNINGS`] are rejected.
pub fn parse_money(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Some(0);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(f64::round)
        .filter(|v| *v <= MAX_EARNINGS as f64)
        .map(|v| v as i64)
}

/// Reads the rows of an export. Headers are matched case-insensitively and
/// blank golfer cells are skipped.
pub fn parse_results(reader: impl Read) -> Result<Vec<ResultRow>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
        .collect::<csv::StringRecord>();
    rdr.set_headers(headers);

    let mut rows = Vec::new();
    for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let record = record?;
        if record.golfer.is_empty() {
            continue;
        }
        let earnings = parse_money(&record.earnings).ok_or_else(|| ImportError::Money {
            row: i + 2,
            value: record.earnings.clone(),
        })?;
        rows.push(ResultRow {
            golfer: record.golfer,
            earnings,
        });
    }
    Ok(rows)
}

/// Earnings per golfer id, plus the names that matched no golfer in the
/// order they first appeared. Rows for the same golfer are summed.
pub fn tally(
    golfers: &[golfer::Model],
    aliases: &[golfer_alias::Model],
    rows: &[ResultRow],
) -> Result<(BTreeMap<i32, i64>, Vec<String>), ImportError> {
    let mut earnings: BTreeMap<i32, i64> = BTreeMap::new();
    let mut unmatched = Vec::new();
    for row in rows {
        match resolve_in(golfers, aliases, &row.golfer) {
            Some(g) => {
                let total = earnings.entry(g.id).or_default();
                *total = total
                    .checked_add(row.earnings)
                    .ok_or_else(|| ImportError::Overflow(g.name.clone()))?;
            }
            None => unmatched.push(row.golfer.clone()),
        }
    }
    Ok((earnings, unmatched.into_iter().unique().collect_vec()))
}

/// Replaces the results of a tournament. Names are resolved through the alias
/// table; names that match no golfer are reported back and not stored.
pub async fn import_results(
    db: &DatabaseConnection,
    tournament_id: i32,
    rows: Vec<ResultRow>,
) -> Result<ImportSummary, ImportError> {
    let tournament = query::get_tournament(db, tournament_id).await?;
    let golfers = Golfer::find().all(db).await?;
    let aliases = GolferAlias::find().all(db).await?;
    let (earnings, unmatched) = tally(&golfers, &aliases, &rows)?;

    let txn = db.begin().await?;
    TournamentResult::delete_many()
        .filter(tournament_result::Column::TournamentId.eq(tournament.id))
        .exec(&txn)
        .await?;
    if !earnings.is_empty() {
        TournamentResult::insert_many(earnings.iter().map(|(golfer_id, amount)| {
            tournament_result::ActiveModel {
                id: NotSet,
                tournament_id: Set(tournament.id),
                golfer_id: Set(*golfer_id),
                earnings: Set(*amount),
            }
        }))
        .exec_without_returning(&txn)
        .await?;
    }
    txn.commit().await?;

    if !unmatched.is_empty() {
        warn!(
            "{} names in results for {} did not match a golfer: {:?}",
            unmatched.len(),
            tournament.name,
            unmatched
        );
    }
    info!("Imported {} results for {}", earnings.len(), tournament.name);
    Ok(ImportSummary {
        imported: earnings.len(),
        unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::tournament;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[test]
    fn money_tolerates_symbols_and_separators() {
        assert_eq!(parse_money("$3,600,000"), Some(3_600_000));
        assert_eq!(parse_money(" 1234.5 "), Some(1235));
        assert_eq!(parse_money(""), Some(0));
        assert_eq!(parse_money("n/a"), None);
        assert_eq!(parse_money("-5"), None);
    }

    #[test]
    fn money_above_the_cap_is_rejected() {
        assert_eq!(parse_money("$1,000,000,000,000"), Some(MAX_EARNINGS));
        assert_eq!(parse_money("1000000000001"), None);
        assert_eq!(parse_money("1e300"), None);
        let err = parse_results("golfer,earnings\nJon Rahm,1e20\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::Money { row: 2, .. }));
        assert_eq!(err.status(), Status::BadRequest);
    }

    #[test]
    fn tally_reports_totals_that_do_not_fit() {
        let golfers = vec![golfer::Model {
            id: 1,
            name: "Jon Rahm".to_string(),
            canonical_name: None,
        }];
        let row = ResultRow {
            golfer: "Jon Rahm".to_string(),
            earnings: i64::MAX,
        };
        let err = tally(&golfers, &[], &[row.clone(), row]).unwrap_err();
        assert!(matches!(&err, ImportError::Overflow(name) if name == "Jon Rahm"));
        assert_eq!(err.status(), Status::BadRequest);
    }

    #[test]
    fn tally_sums_duplicate_rows() {
        let golfers = vec![golfer::Model {
            id: 1,
            name: "Jon Rahm".to_string(),
            canonical_name: None,
        }];
        let rows = vec![
            ResultRow {
                golfer: "Jon Rahm".to_string(),
                earnings: 100,
            },
            ResultRow {
                golfer: "jon rahm".to_string(),
                earnings: 50,
            },
        ];
        let (earnings, unmatched) = tally(&golfers, &[], &rows).unwrap();
        assert_eq!(earnings, BTreeMap::from([(1, 150)]));
        assert!(unmatched.is_empty());
    }

    #[test]
    fn header_aliases_and_case_are_accepted() {
        let csv = "Player,Winnings,Pos\nScottie Scheffler,\"$3,600,000\",1\n,,\nJ. Rahm,$900,2\n";
        let rows = parse_results(csv.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                ResultRow {
                    golfer: "Scottie Scheffler".to_string(),
                    earnings: 3_600_000
                },
                ResultRow {
                    golfer: "J. Rahm".to_string(),
                    earnings: 900
                },
            ]
        );
    }

    #[test]
    fn missing_golfer_column_is_an_error() {
        let err = parse_results("amount\n12\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::Csv(_)));
    }

    #[test]
    fn bad_amount_names_the_row() {
        let err = parse_results("golfer,earnings\nJon Rahm,lots\n".as_bytes()).unwrap_err();
        assert!(matches!(&err, ImportError::Money { row: 2, value } if value == "lots"));
        assert_eq!(err.to_string(), "Row 2: \"lots\" is not an amount");
    }

    #[tokio::test]
    async fn import_resolves_aliases_and_reports_unmatched() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tournament::Model {
                id: 4,
                name: "Masters".to_string(),
                season_id: 1,
                lock_at: chrono::Utc::now().fixed_offset(),
                is_active: false,
                purse: None,
            }]])
            .append_query_results([vec![
                golfer::Model {
                    id: 1,
                    name: "Jon Rahm".to_string(),
                    canonical_name: None,
                },
                golfer::Model {
                    id: 2,
                    name: "Scottie Scheffler".to_string(),
                    canonical_name: None,
                },
            ]])
            .append_query_results([vec![golfer_alias::Model {
                id: 1,
                golfer_id: 1,
                alias: "J Rahm".to_string(),
                alias_key: "j rahm".to_string(),
            }]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 5,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
            ])
            .into_connection();

        let rows = vec![
            ResultRow {
                golfer: "J. Rahm".to_string(),
                earnings: 900,
            },
            ResultRow {
                golfer: "Scheffler, Scottie".to_string(),
                earnings: 3_600_000,
            },
            ResultRow {
                golfer: "Tiger Woods".to_string(),
                earnings: 10,
            },
            ResultRow {
                golfer: "Tiger Woods".to_string(),
                earnings: 10,
            },
        ];
        let summary = import_results(&db, 4, rows).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                unmatched: vec!["Tiger Woods".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn import_for_unknown_tournament_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<tournament::Model>::new()])
            .into_connection();
        let err = import_results(&db, 99, vec![]).await.unwrap_err();
        assert_eq!(err.status(), Status::NotFound);
        assert_eq!(err.to_string(), "Tournament not found");
    }
}
