use log::error;
use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{response, Request, Response};
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::okapi::schemars::Map;
use rocket_okapi::response::OpenApiResponderInner;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use entity::constraint;

#[derive(Debug, Error, Responder)]
pub enum GenericError {
    #[error("{0}")]
    #[response(status = 404)]
    NotFound(&'static str),
    #[error("{0}")]
    #[response(status = 500)]
    UnknownError(&'static str),
    #[error("{0}")]
    #[response(status = 409)]
    Conflict(&'static str),
    #[error("{0}")]
    #[response(status = 400)]
    BadRequest(&'static str),
    #[error("{}", .0.to_err_message())]
    PickError(PickError),
    #[error("{}", .0.to_err_message())]
    AliasError(AliasError),
    #[error(transparent)]
    AuthError(AuthError),
}

/// Errors that carry their own status and a user facing message.
pub trait RocketError {
    fn to_rocket_status(&self) -> Status;
    fn to_err_message(&self) -> &'static str;
}

fn respond_with<'o, E: RocketError>(e: &E) -> response::Result<'o> {
    let msg = e.to_err_message();
    Response::build()
        .status(e.to_rocket_status())
        .header(ContentType::Plain)
        .sized_body(msg.len(), std::io::Cursor::new(msg))
        .ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickError {
    NoActiveTournament,
    NoGolferSelected,
    Locked,
    GolferNotFound,
    AlreadyUsedThisSeason,
    DoubleBooked,
    AlreadyPickedThisEvent,
}

impl RocketError for PickError {
    fn to_rocket_status(&self) -> Status {
        match self {
            Self::NoActiveTournament => Status::NotFound,
            Self::NoGolferSelected => Status::BadRequest,
            Self::Locked => Status::Forbidden,
            Self::GolferNotFound => Status::NotFound,
            Self::AlreadyUsedThisSeason => Status::Conflict,
            Self::DoubleBooked => Status::Conflict,
            Self::AlreadyPickedThisEvent => Status::Conflict,
        }
    }

    fn to_err_message(&self) -> &'static str {
        match self {
            Self::NoActiveTournament => "No active tournament.",
            Self::NoGolferSelected => "Pick a golfer.",
            Self::Locked => "Picks are locked.",
            Self::GolferNotFound => "Golfer not found",
            Self::AlreadyUsedThisSeason => "You have already used this golfer this season.",
            Self::DoubleBooked => "That golfer is already taken this week.",
            Self::AlreadyPickedThisEvent => "You already have a pick for this tournament.",
        }
    }
}

impl PickError {
    /// Maps a unique constraint violation on `pick` to the rule it broke.
    pub fn from_constraint_message(message: &str) -> Option<Self> {
        if message.contains(constraint::PICK_NO_REUSE_IN_SEASON) {
            Some(Self::AlreadyUsedThisSeason)
        } else if message.contains(constraint::PICK_NO_DOUBLE_BOOKING) {
            Some(Self::DoubleBooked)
        } else if message.contains(constraint::PICK_ONE_PER_EVENT) {
            Some(Self::AlreadyPickedThisEvent)
        } else {
            None
        }
    }

    pub fn from_db_err(e: &DbErr) -> Option<Self> {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::from_constraint_message(&msg),
            _ => None,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for PickError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'o> {
        respond_with(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasError {
    Empty,
    MissingLastName,
    AlreadyExists,
    GolferNotFound,
    AliasNotFound,
}

impl RocketError for AliasError {
    fn to_rocket_status(&self) -> Status {
        match self {
            Self::Empty => Status::BadRequest,
            Self::MissingLastName => Status::BadRequest,
            Self::AlreadyExists => Status::Conflict,
            Self::GolferNotFound => Status::NotFound,
            Self::AliasNotFound => Status::NotFound,
        }
    }

    fn to_err_message(&self) -> &'static str {
        match self {
            Self::Empty => "Alias cannot be empty",
            Self::MissingLastName => "Use first + last, e.g. \"Jon Rahm\"",
            Self::AlreadyExists => "Alias already exists.",
            Self::GolferNotFound => "Golfer not found",
            Self::AliasNotFound => "Alias not found",
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for AliasError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'o> {
        respond_with(&self)
    }
}

#[derive(Debug, Error, Responder)]
pub enum AuthError {
    #[error("{0}")]
    #[response(status = 401)]
    Missing(&'static str),
    #[error("{0}")]
    #[response(status = 403)]
    Invalid(&'static str),
    #[error("{0}")]
    #[response(status = 400)]
    BadInput(&'static str),
    #[error("{0}")]
    #[response(status = 403)]
    NotAdmin(&'static str),
    #[error("{0}")]
    #[response(status = 502)]
    MailFailed(&'static str),
}

impl AuthError {
    pub fn status(&self) -> Status {
        match self {
            Self::Missing(_) => Status::Unauthorized,
            Self::Invalid(_) | Self::NotAdmin(_) => Status::Forbidden,
            Self::BadInput(_) => Status::BadRequest,
            Self::MailFailed(_) => Status::BadGateway,
        }
    }
}

impl From<PickError> for GenericError {
    fn from(e: PickError) -> Self {
        Self::PickError(e)
    }
}

impl From<AliasError> for GenericError {
    fn from(e: AliasError) -> Self {
        Self::AliasError(e)
    }
}

impl From<AuthError> for GenericError {
    fn from(e: AuthError) -> Self {
        Self::AuthError(e)
    }
}

impl From<DbErr> for GenericError {
    fn from(e: DbErr) -> Self {
        error!("Unhandled database error: {:#?}", e);
        Self::UnknownError("Unknown database error")
    }
}

impl GenericError {
    /// Maps a unique constraint violation to a 409 with `msg`, anything else to 500.
    pub fn conflict_or_unknown(e: DbErr, msg: &'static str) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(msg),
            _ => e.into(),
        }
    }

    /// The status this error responds with, for routes that wrap errors in their own body.
    pub fn status(&self) -> Status {
        match self {
            Self::NotFound(_) => Status::NotFound,
            Self::UnknownError(_) => Status::InternalServerError,
            Self::Conflict(_) => Status::Conflict,
            Self::BadRequest(_) => Status::BadRequest,
            Self::PickError(e) => e.to_rocket_status(),
            Self::AliasError(e) => e.to_rocket_status(),
            Self::AuthError(e) => e.status(),
        }
    }
}

impl OpenApiResponderInner for GenericError {
    fn responses(_: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};

        let mut responses = Map::new();
        responses.insert(
            "400".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "\
                # [400 Bad Request](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/400)\n\
                The request given is wrongly formatted or data asked could not be fulfilled. \
                "
                .to_string(),
                ..Default::default()
            }),
        );
        responses.insert(
            "401".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "\
                # [401 Unauthorized](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/401)\n\
                This response is given when the request has no valid session cookie. \
                "
                .to_string(),
                ..Default::default()
            }),
        );
        responses.insert(
            "403".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "\
                # [403 Forbidden](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/403)\n\
                This response is given when the action is not allowed, e.g. picks are locked. \
                "
                .to_string(),
                ..Default::default()
            }),
        );
        responses.insert(
            "404".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "\
                # [404 Not Found](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/404)\n\
                This response is given when you request a page that does not exists.\
                "
                .to_string(),
                ..Default::default()
            }),
        );
        responses.insert(
            "409".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "\
                # [409 Conflict](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/409)\n\
                This response is given when you try to create a resource that already exists, \
                or reuse a golfer that is not available. \
                "
                .to_string(),
                ..Default::default()
            }),
        );
        responses.insert(
            "422".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "\
                # [422 Unprocessable Entity](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/422)\n\
                This response is given when you request body is not correctly formatted. \
                ".to_string(),
                ..Default::default()
            }),
        );
        responses.insert(
            "500".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "\
                # [500 Internal Server Error](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/500)\n\
                This response is given when something wend wrong on the server. \
                ".to_string(),
                ..Default::default()
            }),
        );
        Ok(Responses {
            responses,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_map_to_pick_rules() {
        let msg = "duplicate key value violates unique constraint \"pick_no_reuse_in_season\"";
        assert_eq!(
            PickError::from_constraint_message(msg),
            Some(PickError::AlreadyUsedThisSeason)
        );
        let msg = "duplicate key value violates unique constraint \"pick_no_double_booking\"";
        assert_eq!(PickError::from_constraint_message(msg), Some(PickError::DoubleBooked));
        let msg = "duplicate key value violates unique constraint \"pick_one_per_event\"";
        assert_eq!(
            PickError::from_constraint_message(msg),
            Some(PickError::AlreadyPickedThisEvent)
        );
        assert_eq!(
            PickError::from_constraint_message("violates unique constraint \"user_email_key\""),
            None
        );
    }

    #[test]
    fn non_sql_errors_are_not_pick_conflicts() {
        assert_eq!(PickError::from_db_err(&DbErr::Custom("boom".to_string())), None);
    }

    #[test]
    fn lock_is_forbidden_not_conflict() {
        assert_eq!(PickError::Locked.to_rocket_status(), Status::Forbidden);
        assert_eq!(PickError::Locked.to_err_message(), "Picks are locked.");
        assert_eq!(AliasError::AlreadyExists.to_rocket_status(), Status::Conflict);
    }

    #[test]
    fn display_is_the_user_facing_message() {
        assert_eq!(
            GenericError::NotFound("Tournament not found").to_string(),
            "Tournament not found"
        );
        assert_eq!(
            GenericError::from(PickError::DoubleBooked).to_string(),
            "That golfer is already taken this week."
        );
        assert_eq!(
            GenericError::from(AliasError::Empty).to_string(),
            "Alias cannot be empty"
        );
        assert_eq!(
            GenericError::from(AuthError::Invalid("Invalid invite code")).to_string(),
            "Invalid invite code"
        );
    }

    #[test]
    fn status_matches_the_responder() {
        assert_eq!(GenericError::NotFound("x").status(), Status::NotFound);
        assert_eq!(
            GenericError::from(DbErr::Custom("boom".to_string())).status(),
            Status::InternalServerError
        );
        assert_eq!(GenericError::Conflict("x").status(), Status::Conflict);
        assert_eq!(GenericError::from(PickError::Locked).status(), Status::Forbidden);
        assert_eq!(
            GenericError::from(AliasError::AliasNotFound).status(),
            Status::NotFound
        );
        assert_eq!(
            GenericError::from(AuthError::Missing("x")).status(),
            Status::Unauthorized
        );
        assert_eq!(
            GenericError::from(AuthError::MailFailed("x")).status(),
            Status::BadGateway
        );
    }
}
