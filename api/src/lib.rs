mod authenticate;
mod mutation;
mod query;
mod results;

use rocket_okapi::openapi_get_routes;

#[macro_use]
extern crate rocket;

use authenticate::*;
use dotenvy::dotenv;
use log::info;
use migration::{Migrator, MigratorTrait};
use mutation::*;
use query::*;
use results::*;
use rocket::{Build, Request, Rocket, Route};
use sea_orm::DatabaseConnection;

use rocket_okapi::rapidoc::{make_rapidoc, GeneralConfig, HideShowConfig, RapiDocConfig};
use rocket_okapi::settings::UrlObject;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};
use service::mailer::mailer_from_settings;
use service::{MagicLinkMailer, Settings};

#[catch(404)]
fn general_not_found() -> &'static str {
    "Api endpoint not found"
}

#[catch(401)]
fn unauthorized(req: &Request) -> &'static str {
    req.local_cache(|| GuardMessage(SIGN_IN_FIRST)).0
}

#[catch(403)]
fn forbidden(req: &Request) -> &'static str {
    req.local_cache(|| GuardMessage(NO_PERMISSION)).0
}

pub fn routes() -> Vec<Route> {
    openapi_get_routes![
        request_magic_link,
        magic_link_callback,
        me,
        logout,
        logout_all,
        get_pick_page,
        submit_pick,
        get_active_tournament,
        get_golfers,
        resolve_golfer,
        get_summary,
        get_standings,
        get_season_picks,
        get_golfers_with_aliases,
        get_aliases,
        add_alias,
        remove_alias,
        create_season,
        create_tournament,
        activate_tournament,
        create_golfer,
        upload_results,
    ]
}

/// The API over an already connected database.
pub fn build(
    db: DatabaseConnection,
    settings: Settings,
    mailer: Box<dyn MagicLinkMailer>,
) -> Rocket<Build> {
    rocket::build()
        .manage(db)
        .manage(settings)
        .manage(mailer)
        .mount("/api", routes())
        .mount(
            "/api/swagger",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/api/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("General", "./openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
        .register("/api", catchers![general_not_found, unauthorized, forbidden])
}

pub async fn launch() -> Result<Rocket<Build>, Box<dyn std::error::Error>> {
    dotenv().ok();
    let settings = Settings::from_env()?;

    let db = sea_orm::Database::connect(settings.database_url.as_str()).await?;
    Migrator::up(&db, None).await?;
    info!("Database migrated");

    let mailer = mailer_from_settings(&settings);
    Ok(build(db, settings, mailer))
}
