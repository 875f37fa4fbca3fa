pub use sea_orm_migration::prelude::*;
mod enums;
mod m20250301_000001_create_users_and_sessions;
mod m20250301_000002_create_seasons_and_tournaments;
mod m20250301_000003_create_golfers_and_aliases;
mod m20250301_000004_create_picks_and_results;
mod macros;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_and_sessions::Migration),
            Box::new(m20250301_000002_create_seasons_and_tournaments::Migration),
            Box::new(m20250301_000003_create_golfers_and_aliases::Migration),
            Box::new(m20250301_000004_create_picks_and_results::Migration),
        ]
    }
}
