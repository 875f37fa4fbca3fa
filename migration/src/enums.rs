use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub(crate) enum User {
    Table,
    Id,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum UserSession {
    Table,
    Token,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum LoginToken {
    Table,
    Id,
    Email,
    TokenHash,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Season {
    Table,
    Id,
    Name,
    Year,
}

#[derive(DeriveIden)]
pub(crate) enum Tournament {
    Table,
    Id,
    Name,
    SeasonId,
    LockAt,
    IsActive,
    Purse,
}

#[derive(DeriveIden)]
pub(crate) enum Golfer {
    Table,
    Id,
    Name,
    CanonicalName,
}

#[derive(DeriveIden)]
pub(crate) enum GolferAlias {
    Table,
    Id,
    GolferId,
    Alias,
    AliasKey,
}

#[derive(DeriveIden)]
pub(crate) enum Pick {
    Table,
    Id,
    UserId,
    TournamentId,
    SeasonId,
    GolferId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum TournamentResult {
    Table,
    Id,
    TournamentId,
    GolferId,
    Earnings,
}
