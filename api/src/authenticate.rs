use chrono::Utc;
use log::{error, info};
use rocket::http::{CookieJar, Status};
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest};
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post, Request, State};
use rocket_okapi::{openapi, request::OpenApiFromRequest};
use sea_orm::DatabaseConnection;

use entity::user::Model as UserModel;
use service::auth::{self, AUTH_COOKIE};
use service::dto::{MagicLinkRequest, Me};
use service::error::{AuthError, GenericError};
use service::{MagicLinkMailer, Settings};

pub(crate) const SIGN_IN_FIRST: &str = "Please sign in first.";
pub(crate) const NO_PERMISSION: &str = "You do not have permission to do that";
const SESSION_EXPIRED: &str = "Your session has expired. Sign in again.";
const NOT_ADMIN: &str = "Not authorized. Ask an admin to add your email to ADMIN_EMAILS.";

/// Why a guard turned the request away, read back by the 401/403 catchers.
pub(crate) struct GuardMessage(pub &'static str);

fn reject<T>(
    request: &Request<'_>,
    status: Status,
    error: AuthError,
    msg: &'static str,
) -> request::Outcome<T, GenericError> {
    request.local_cache(|| GuardMessage(msg));
    Outcome::Error((status, error.into()))
}

#[derive(OpenApiFromRequest, Debug)]
pub struct UserAuthentication {
    user: UserModel,
    session: String,
}

impl UserAuthentication {
    pub fn user(&self) -> &UserModel {
        &self.user
    }

    pub fn id(&self) -> i32 {
        self.user.id
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserAuthentication {
    type Error = GenericError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = request
            .rocket()
            .state::<DatabaseConnection>()
            .expect("Database not found");

        let session = match request.cookies().get_private(AUTH_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => {
                return reject(
                    request,
                    Status::Unauthorized,
                    AuthError::Missing(SIGN_IN_FIRST),
                    SIGN_IN_FIRST,
                )
            }
        };

        match auth::session_user(db, &session).await {
            Ok(Some(user)) => Outcome::Success(Self { user, session }),
            Ok(None) => reject(
                request,
                Status::Forbidden,
                AuthError::Invalid(SESSION_EXPIRED),
                SESSION_EXPIRED,
            ),
            Err(e) => {
                error!("Unable to look up session: {}", e);
                Outcome::Error((Status::InternalServerError, e))
            }
        }
    }
}

#[derive(OpenApiFromRequest, Debug)]
pub struct AdminUser(UserAuthentication);

impl AdminUser {
    pub fn user(&self) -> &UserModel {
        self.0.user()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = GenericError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let settings = request
            .rocket()
            .state::<Settings>()
            .expect("Settings not found");

        match request.guard::<UserAuthentication>().await {
            Outcome::Success(user) if settings.is_admin(&user.user().email) => {
                Outcome::Success(Self(user))
            }
            Outcome::Success(user) => {
                info!("{} tried to use an admin endpoint", user.user().email);
                reject(
                    request,
                    Status::Forbidden,
                    AuthError::NotAdmin(NOT_ADMIN),
                    NOT_ADMIN,
                )
            }
            Outcome::Error(e) => Outcome::Error(e),
            Outcome::Forward(s) => Outcome::Forward(s),
        }
    }
}

/// # Request a sign-in link
///
/// Checks the league invite code and mails a single-use sign-in link to the
/// given address.
#[openapi(tag = "Auth")]
#[post("/auth/magic-link", format = "json", data = "<request>")]
pub(crate) async fn request_magic_link(
    request: Json<MagicLinkRequest>,
    db: &State<DatabaseConnection>,
    settings: &State<Settings>,
    mailer: &State<Box<dyn MagicLinkMailer>>,
) -> Result<&'static str, GenericError> {
    auth::request_magic_link(
        db.inner(),
        settings.inner(),
        mailer.inner().as_ref(),
        request.into_inner(),
        Utc::now(),
    )
    .await
}

/// Target of the emailed link. Starts a session and sends the browser home.
#[openapi(skip)]
#[get("/auth/callback?<token>")]
pub(crate) async fn magic_link_callback(
    token: &str,
    db: &State<DatabaseConnection>,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, GenericError> {
    let user = auth::redeem_magic_link(db.inner(), token, Utc::now()).await?;
    auth::generate_session(db.inner(), user.id, cookies).await?;
    info!("{} signed in", user.email);
    Ok(Redirect::to("/"))
}

#[openapi(tag = "Auth")]
#[get("/me")]
pub(crate) async fn me(user: UserAuthentication, settings: &State<Settings>) -> Json<Me> {
    let user = user.user();
    Json(Me {
        id: user.id,
        email: user.email.clone(),
        is_admin: settings.is_admin(&user.email),
    })
}

#[openapi(tag = "Auth")]
#[post("/logout")]
pub(crate) async fn logout(
    db: &State<DatabaseConnection>,
    cookies: &CookieJar<'_>,
    user: UserAuthentication,
) -> Result<&'static str, GenericError> {
    auth::remove_session(db.inner(), &user.session, cookies).await
}

#[openapi(tag = "Auth")]
#[post("/logout-all")]
pub(crate) async fn logout_all(
    db: &State<DatabaseConnection>,
    cookies: &CookieJar<'_>,
    user: UserAuthentication,
) -> Result<&'static str, GenericError> {
    auth::remove_all_sessions(db.inner(), user.id(), cookies).await
}
