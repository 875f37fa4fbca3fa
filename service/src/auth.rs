use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::distributions::{Alphanumeric, DistString};
use rocket::http::{Cookie, CookieJar, SameSite};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, TransactionTrait};

use entity::prelude::{LoginToken, UserSession};
use entity::{login_token, user, user_session};

use crate::config::Settings;
use crate::dto::MagicLinkRequest;
use crate::error::{AuthError, GenericError};
use crate::mailer::MagicLinkMailer;
use crate::query;

pub const AUTH_COOKIE: &str = "auth";
const SECRET_LEN: usize = 32;
const INVALID_LINK: &str = "Invalid or expired sign-in link";

pub fn check_invite_code(expected: &str, given: &str) -> Result<(), AuthError> {
    let given = given.trim();
    if given.is_empty() {
        Err(AuthError::BadInput("Enter invite code"))
    } else if given != expected {
        Err(AuthError::Invalid("Invalid invite code"))
    } else {
        Ok(())
    }
}

/// Trims and lowercases an address after a shape check; delivery is the
/// real validation.
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(email)
        }
        _ => Err(AuthError::BadInput("Enter a valid email")),
    }
}

/// A sign-in token is `<login_token id>.<secret>`.
pub fn split_token(token: &str) -> Option<(i32, &str)> {
    let (id, secret) = token.split_once('.')?;
    let id = id.parse().ok()?;
    (!secret.is_empty()).then_some((id, secret))
}

pub fn magic_link(settings: &Settings, token: &str) -> String {
    format!("{}/api/auth/callback?token={}", settings.site_url, token)
}

pub async fn request_magic_link(
    db: &impl ConnectionTrait,
    settings: &Settings,
    mailer: &dyn MagicLinkMailer,
    request: MagicLinkRequest,
    now: DateTime<Utc>,
) -> Result<&'static str, GenericError> {
    check_invite_code(&settings.invite_code, &request.invite_code)?;
    let email = normalize_email(&request.email)?;

    let secret = Alphanumeric.sample_string(&mut rand::thread_rng(), SECRET_LEN);
    let token_hash = hash(&secret, DEFAULT_COST)
        .map_err(|_| GenericError::UnknownError("Unable to create sign-in link"))?;

    let token = login_token::ActiveModel {
        id: NotSet,
        email: Set(email.clone()),
        token_hash: Set(token_hash),
        expires_at: Set((now + settings.magic_link_ttl).fixed_offset()),
        used_at: Set(None),
        created_at: Set(now.fixed_offset()),
    }
    .insert(db)
    .await?;

    let link = magic_link(settings, &format!("{}.{}", token.id, secret));
    mailer.send_magic_link(&email, &link).await?;
    info!("Sent magic link {} to {}", token.id, email);
    Ok("Check your email for the magic link!")
}

/// Consumes a sign-in token and returns the user it belongs to, creating the
/// user on first sign-in.
pub async fn redeem_magic_link(
    db: &DatabaseConnection,
    token: &str,
    now: DateTime<Utc>,
) -> Result<user::Model, GenericError> {
    let (id, secret) = split_token(token).ok_or(AuthError::Invalid(INVALID_LINK))?;

    let txn = db.begin().await?;
    let login = LoginToken::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AuthError::Invalid(INVALID_LINK))?;

    if login.used_at.is_some() || login.expires_at.with_timezone(&Utc) <= now {
        warn!("Rejected used or expired sign-in token {}", login.id);
        return Err(AuthError::Invalid(INVALID_LINK).into());
    }
    if !verify(secret, &login.token_hash).unwrap_or(false) {
        warn!("Rejected sign-in token {} with a bad secret", login.id);
        return Err(AuthError::Invalid(INVALID_LINK).into());
    }

    let consumed = LoginToken::update_many()
        .col_expr(login_token::Column::UsedAt, Expr::value(now.fixed_offset()))
        .filter(login_token::Column::Id.eq(login.id))
        .filter(login_token::Column::UsedAt.is_null())
        .exec(&txn)
        .await?;
    if consumed.rows_affected != 1 {
        warn!("Sign-in token {} was used by another request", login.id);
        return Err(AuthError::Invalid(INVALID_LINK).into());
    }

    let email = login.email;
    let user = match query::get_user_by_email(&txn, &email).await? {
        Some(user) => user,
        None => {
            info!("Creating user for {}", email);
            user::ActiveModel {
                id: NotSet,
                email: Set(email),
                created_at: Set(now.fixed_offset()),
            }
            .insert(&txn)
            .await?
        }
    };
    txn.commit().await?;
    Ok(user)
}

/// Stores a new session for the user and sets it as the private auth cookie.
pub async fn generate_session(
    db: &impl ConnectionTrait,
    user_id: i32,
    cookies: &CookieJar<'_>,
) -> Result<(), GenericError> {
    let token = uuid::Uuid::new_v4().to_string();
    user_session::ActiveModel {
        token: Set(token.clone()),
        user_id: Set(user_id),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(db)
    .await?;

    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookies.add_private(cookie);
    Ok(())
}

pub async fn session_user(
    db: &impl ConnectionTrait,
    token: &str,
) -> Result<Option<user::Model>, GenericError> {
    match UserSession::find_by_id(token.to_owned()).one(db).await? {
        Some(session) => query::get_user(db, session.user_id).await,
        None => Ok(None),
    }
}

pub async fn remove_session(
    db: &impl ConnectionTrait,
    token: &str,
    cookies: &CookieJar<'_>,
) -> Result<&'static str, GenericError> {
    UserSession::delete_by_id(token.to_owned()).exec(db).await?;
    cookies.remove_private(AUTH_COOKIE);
    Ok("Successfully logged out")
}

pub async fn remove_all_sessions(
    db: &impl ConnectionTrait,
    user_id: i32,
    cookies: &CookieJar<'_>,
) -> Result<&'static str, GenericError> {
    let removed = UserSession::delete_many()
        .filter(user_session::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    info!("Removed {} sessions for user {}", removed.rows_affected, user_id);
    cookies.remove_private(AUTH_COOKIE);
    Ok("Successfully logged out")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer(Mutex<Vec<(String, String)>>);

    #[rocket::async_trait]
    impl MagicLinkMailer for RecordingMailer {
        async fn send_magic_link(&self, email: &str, link: &str) -> Result<(), GenericError> {
            self.0.lock().unwrap().push((email.to_string(), link.to_string()));
            Ok(())
        }
    }

    fn settings() -> Settings {
        Settings {
            database_url: "postgres://localhost/league".to_string(),
            invite_code: "birdie".to_string(),
            admin_emails: vec![],
            site_url: "https://league.example.com".to_string(),
            mail_webhook_url: None,
            magic_link_ttl: Duration::minutes(60),
        }
    }

    fn login(id: i32, secret: &str, expires_in: Duration, now: DateTime<Utc>) -> login_token::Model {
        login_token::Model {
            id,
            email: "player@example.com".to_string(),
            token_hash: hash(secret, 4).unwrap(),
            expires_at: (now + expires_in).fixed_offset(),
            used_at: None,
            created_at: now.fixed_offset(),
        }
    }

    #[test]
    fn invite_code_checks() {
        assert!(matches!(
            check_invite_code("birdie", "  "),
            Err(AuthError::BadInput("Enter invite code"))
        ));
        assert!(matches!(
            check_invite_code("birdie", "bogey"),
            Err(AuthError::Invalid("Invalid invite code"))
        ));
        assert!(check_invite_code("birdie", " birdie ").is_ok());
    }

    #[test]
    fn emails_are_lowercased_and_shape_checked() {
        assert_eq!(normalize_email(" Player@Example.COM ").unwrap(), "player@example.com");
        assert!(normalize_email("player").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("player@localhost").is_err());
        assert!(normalize_email("pla yer@example.com").is_err());
    }

    #[test]
    fn tokens_split_into_id_and_secret() {
        assert_eq!(split_token("12.abcDEF"), Some((12, "abcDEF")));
        assert_eq!(split_token("12."), None);
        assert_eq!(split_token("x.abc"), None);
        assert_eq!(split_token("abc"), None);
    }

    #[tokio::test]
    async fn wrong_invite_code_sends_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mailer = RecordingMailer::default();
        let res = request_magic_link(
            &db,
            &settings(),
            &mailer,
            MagicLinkRequest {
                email: "player@example.com".to_string(),
                invite_code: "par".to_string(),
            },
            Utc::now(),
        )
        .await;
        assert!(matches!(res, Err(GenericError::AuthError(AuthError::Invalid(_)))));
        assert!(mailer.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn magic_link_is_mailed_with_token_id() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![login(41, "unused", Duration::minutes(60), now)]])
            .into_connection();
        let mailer = RecordingMailer::default();

        let msg = request_magic_link(
            &db,
            &settings(),
            &mailer,
            MagicLinkRequest {
                email: "Player@Example.com".to_string(),
                invite_code: "birdie".to_string(),
            },
            now,
        )
        .await
        .unwrap();

        assert_eq!(msg, "Check your email for the magic link!");
        let sent = mailer.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "player@example.com");
        assert!(sent[0]
            .1
            .starts_with("https://league.example.com/api/auth/callback?token=41."));
    }

    #[tokio::test]
    async fn expired_link_is_rejected() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![login(3, "secret", Duration::minutes(-1), now)]])
            .into_connection();

        let res = redeem_magic_link(&db, "3.secret", now).await;
        assert!(matches!(res, Err(GenericError::AuthError(AuthError::Invalid(_)))));
    }

    #[tokio::test]
    async fn used_link_is_rejected() {
        let now = Utc::now();
        let mut token = login(3, "secret", Duration::minutes(10), now);
        token.used_at = Some((now - Duration::minutes(1)).fixed_offset());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![token]])
            .into_connection();

        let res = redeem_magic_link(&db, "3.secret", now).await;
        assert!(matches!(res, Err(GenericError::AuthError(AuthError::Invalid(_)))));
    }

    #[tokio::test]
    async fn link_consumed_by_a_concurrent_request_is_rejected() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![login(3, "secret", Duration::minutes(10), now)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let res = redeem_magic_link(&db, "3.secret", now).await;
        assert!(matches!(res, Err(GenericError::AuthError(AuthError::Invalid(_)))));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![login(3, "secret", Duration::minutes(10), now)]])
            .into_connection();

        let res = redeem_magic_link(&db, "3.guess", now).await;
        assert!(matches!(res, Err(GenericError::AuthError(AuthError::Invalid(_)))));
    }

    #[tokio::test]
    async fn first_sign_in_creates_the_user() {
        let now = Utc::now();
        let token = login(3, "secret", Duration::minutes(10), now);
        let created = user::Model {
            id: 7,
            email: "player@example.com".to_string(),
            created_at: now.fixed_offset(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![token]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([vec![created.clone()]])
            .into_connection();

        let user = redeem_magic_link(&db, "3.secret", now).await.unwrap();
        assert_eq!(user, created);
    }
}
