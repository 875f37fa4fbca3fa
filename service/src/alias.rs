//! Alternate spellings of golfer names and matching free text to a golfer.
//!
//! Every comparison goes through [`normalize`], so "J. Rahm", "j rahm" and
//! " J  Rahm " are the same alias.

use itertools::Itertools;
use log::info;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::QueryOrder;

use entity::prelude::{Golfer, GolferAlias};
use entity::{golfer, golfer_alias};

use crate::dto::{Alias, AliasInput, GolferWithAliasCount};
use crate::error::{AliasError, GenericError};

/// Lowercases, drops punctuation that varies between sources and collapses
/// whitespace.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '.' | '\'' | '’' | ','))
        .map(|c| if matches!(c, '-' | '_') { ' ' } else { c })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .join(" ")
}

/// Checks an alias typed by an admin and returns it trimmed.
pub fn validate_alias(text: &str) -> Result<&str, AliasError> {
    let alias = text.trim();
    if alias.is_empty() {
        Err(AliasError::Empty)
    } else if !alias.contains(char::is_whitespace) {
        Err(AliasError::MissingLastName)
    } else {
        Ok(alias)
    }
}

fn display_name(g: &golfer::Model) -> &str {
    g.canonical_name.as_deref().unwrap_or(&g.name)
}

/// "Rahm, Jon" -> "Jon Rahm". Only a single comma is treated as a
/// last-name-first listing.
fn swap_last_first(text: &str) -> Option<String> {
    let (last, first) = text.split_once(',')?;
    if first.contains(',') || first.trim().is_empty() || last.trim().is_empty() {
        return None;
    }
    Some(format!("{} {}", first.trim(), last.trim()))
}

/// Resolves free text against already loaded golfers and aliases. Canonical
/// names win over plain names, which win over aliases.
pub fn resolve_in<'a>(
    golfers: &'a [golfer::Model],
    aliases: &[golfer_alias::Model],
    text: &str,
) -> Option<&'a golfer::Model> {
    let candidates = std::iter::once(normalize(text))
        .chain(swap_last_first(text).map(|t| normalize(&t)))
        .filter(|key| !key.is_empty())
        .collect_vec();

    candidates.iter().find_map(|key| {
        golfers
            .iter()
            .find(|g| g.canonical_name.as_deref().map(normalize).as_ref() == Some(key))
            .or_else(|| golfers.iter().find(|g| normalize(&g.name) == *key))
            .or_else(|| {
                aliases
                    .iter()
                    .find(|a| a.alias_key == *key)
                    .and_then(|a| golfers.iter().find(|g| g.id == a.golfer_id))
            })
    })
}

pub async fn resolve(
    db: &impl ConnectionTrait,
    text: &str,
) -> Result<Option<golfer::Model>, GenericError> {
    let golfers = Golfer::find().all(db).await?;
    let aliases = GolferAlias::find().all(db).await?;
    Ok(resolve_in(&golfers, &aliases, text).cloned())
}

pub async fn aliases_for(
    db: &impl ConnectionTrait,
    golfer_id: i32,
) -> Result<Vec<Alias>, GenericError> {
    Ok(GolferAlias::find()
        .filter(golfer_alias::Column::GolferId.eq(golfer_id))
        .order_by_asc(golfer_alias::Column::Alias)
        .all(db)
        .await?
        .into_iter()
        .map(Alias::from)
        .collect())
}

pub async fn golfers_with_alias_counts(
    db: &impl ConnectionTrait,
) -> Result<Vec<GolferWithAliasCount>, GenericError> {
    let golfers = Golfer::find().all(db).await?;
    let counts = GolferAlias::find()
        .all(db)
        .await?
        .into_iter()
        .map(|a| a.golfer_id)
        .counts();

    Ok(golfers
        .iter()
        .sorted_by_cached_key(|g| display_name(g).to_lowercase())
        .map(|g| GolferWithAliasCount {
            id: g.id,
            display_name: display_name(g).to_string(),
            alias_count: counts.get(&g.id).copied().unwrap_or(0),
        })
        .collect())
}

/// Adds an alias to a golfer. Aliases are unique across all golfers so a
/// spelling always resolves to one record.
pub async fn add_alias(
    db: &impl ConnectionTrait,
    golfer_id: i32,
    input: AliasInput,
) -> Result<Alias, GenericError> {
    let alias = validate_alias(&input.alias)?;
    let key = normalize(alias);

    if Golfer::find_by_id(golfer_id).one(db).await?.is_none() {
        return Err(AliasError::GolferNotFound.into());
    }

    let existing = GolferAlias::find()
        .filter(golfer_alias::Column::AliasKey.eq(key.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AliasError::AlreadyExists.into());
    }

    let model = golfer_alias::ActiveModel {
        id: NotSet,
        golfer_id: Set(golfer_id),
        alias: Set(alias.to_string()),
        alias_key: Set(key),
    }
    .insert(db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => AliasError::AlreadyExists.into(),
        _ => GenericError::from(e),
    })?;

    info!("Added alias {:?} to golfer {}", model.alias, golfer_id);
    Ok(model.into())
}

pub async fn remove_alias(db: &impl ConnectionTrait, alias_id: i32) -> Result<(), GenericError> {
    let result = GolferAlias::delete_by_id(alias_id).exec(db).await?;
    if result.rows_affected == 0 {
        Err(AliasError::AliasNotFound.into())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn golfer(id: i32, name: &str, canonical: Option<&str>) -> golfer::Model {
        golfer::Model {
            id,
            name: name.to_string(),
            canonical_name: canonical.map(str::to_string),
        }
    }

    fn alias(id: i32, golfer_id: i32, text: &str) -> golfer_alias::Model {
        golfer_alias::Model {
            id,
            golfer_id,
            alias: text.to_string(),
            alias_key: normalize(text),
        }
    }

    #[test]
    fn normalize_collapses_spelling_differences() {
        assert_eq!(normalize("  J.  Rahm "), "j rahm");
        assert_eq!(normalize("Matt Fitzpatrick"), "matt fitzpatrick");
        assert_eq!(normalize("Byeong-Hun An"), "byeong hun an");
        assert_eq!(normalize("O’Hair"), "ohair");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn alias_needs_first_and_last() {
        assert_eq!(validate_alias("Rahm"), Err(AliasError::MissingLastName));
        assert_eq!(validate_alias("   "), Err(AliasError::Empty));
        assert_eq!(validate_alias("  J Rahm "), Ok("J Rahm"));
    }

    #[test]
    fn resolution_prefers_canonical_then_name_then_alias() {
        let golfers = vec![
            golfer(1, "Jon Rahm", Some("Jon Rahm Rodriguez")),
            golfer(2, "Scottie Scheffler", None),
            golfer(3, "Rory McIlroy", None),
        ];
        let aliases = vec![alias(10, 3, "R. McIlroy"), alias(11, 1, "J Rahm")];

        assert_eq!(resolve_in(&golfers, &aliases, "jon rahm rodriguez").map(|g| g.id), Some(1));
        assert_eq!(resolve_in(&golfers, &aliases, "Jon  Rahm").map(|g| g.id), Some(1));
        assert_eq!(resolve_in(&golfers, &aliases, "SCOTTIE SCHEFFLER").map(|g| g.id), Some(2));
        assert_eq!(resolve_in(&golfers, &aliases, "r mcilroy").map(|g| g.id), Some(3));
        assert_eq!(resolve_in(&golfers, &aliases, "j. rahm").map(|g| g.id), Some(1));
        assert!(resolve_in(&golfers, &aliases, "Tiger Woods").is_none());
        assert!(resolve_in(&golfers, &aliases, "").is_none());
    }

    #[test]
    fn last_name_first_listings_resolve() {
        let golfers = vec![golfer(2, "Scottie Scheffler", None)];
        assert_eq!(resolve_in(&golfers, &[], "Scheffler, Scottie").map(|g| g.id), Some(2));
        assert!(resolve_in(&golfers, &[], "Scheffler,").is_none());
    }

    #[tokio::test]
    async fn counts_follow_display_order() {
        let golfers = vec![golfer(1, "zed", Some("Adam Scott")), golfer(2, "Brooks Koepka", None)];
        let aliases = vec![alias(1, 2, "B Koepka"), alias(2, 2, "Brooks K")];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([golfers])
            .append_query_results([aliases])
            .into_connection();

        let listed = golfers_with_alias_counts(&db).await.unwrap();
        assert_eq!(
            listed,
            vec![
                GolferWithAliasCount {
                    id: 1,
                    display_name: "Adam Scott".to_string(),
                    alias_count: 0
                },
                GolferWithAliasCount {
                    id: 2,
                    display_name: "Brooks Koepka".to_string(),
                    alias_count: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn duplicate_alias_is_rejected_case_insensitively() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![golfer(1, "Jon Rahm", None)]])
            .append_query_results([vec![alias(4, 2, "J Rahm")]])
            .into_connection();

        let res = add_alias(
            &db,
            1,
            AliasInput {
                alias: "j RAHM".to_string(),
            },
        )
        .await;
        assert!(matches!(
            res,
            Err(GenericError::AliasError(AliasError::AlreadyExists))
        ));
    }

    #[tokio::test]
    async fn alias_for_missing_golfer_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<golfer::Model>::new()])
            .into_connection();

        let res = add_alias(
            &db,
            99,
            AliasInput {
                alias: "Jon Rahm".to_string(),
            },
        )
        .await;
        assert!(matches!(
            res,
            Err(GenericError::AliasError(AliasError::GolferNotFound))
        ));
    }

    #[tokio::test]
    async fn alias_is_stored_trimmed_with_its_key() {
        let stored = alias(7, 1, "J. Rahm");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![golfer(1, "Jon Rahm", None)]])
            .append_query_results([Vec::<golfer_alias::Model>::new()])
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let added = add_alias(
            &db,
            1,
            AliasInput {
                alias: "  J. Rahm ".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(added, Alias::from(stored));
    }

    #[tokio::test]
    async fn removing_unknown_alias_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        assert!(matches!(
            remove_alias(&db, 5).await,
            Err(GenericError::AliasError(AliasError::AliasNotFound))
        ));
    }
}
