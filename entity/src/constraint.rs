//! Names of the unique constraints created by the migrations. Violation
//! messages from Postgres carry these names.

pub const PICK_ONE_PER_EVENT: &str = "pick_one_per_event";
pub const PICK_NO_REUSE_IN_SEASON: &str = "pick_no_reuse_in_season";
pub const PICK_NO_DOUBLE_BOOKING: &str = "pick_no_double_booking";
pub const GOLFER_ALIAS_KEY: &str = "golfer_alias_key";
