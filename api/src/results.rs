use log::{info, warn};
use rocket::form::{Errors, Form};
use rocket::FromForm;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::tokio::io::AsyncReadExt;
use rocket::{post, State};
use rocket_okapi::openapi;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use service::results;

use crate::authenticate::AdminUser;

const MISSING_FILE: &str = "Upload a CSV named 'file'.";
const EMPTY_FILE: &str = "The uploaded CSV is empty.";

#[derive(FromForm)]
pub(crate) struct ResultsUpload<'r> {
    file: Option<TempFile<'r>>,
    tournament_id: Option<i32>,
}

fn failed(status: Status, error: impl Into<String>) -> (Status, Json<Value>) {
    let error: String = error.into();
    (status, Json(json!({ "ok": false, "error": error })))
}

async fn read_file(file: &TempFile<'_>) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(file.len() as usize);
    let reader = file.open().await?;
    rocket::tokio::pin!(reader);
    reader.read_to_end(&mut bytes).await?;
    Ok(bytes)
}

/// Upload a results CSV. With a `tournament_id` the results of that
/// tournament are replaced by the file's rows.
///
/// Every failure answers with `{"ok": false, "error": ...}`.
#[openapi(skip)]
#[post("/results", data = "<upload>")]
pub(crate) async fn upload_results(
    upload: Option<Result<Form<ResultsUpload<'_>>, Errors<'_>>>,
    db: &State<DatabaseConnection>,
    admin: AdminUser,
) -> (Status, Json<Value>) {
    let upload = match upload {
        Some(Ok(upload)) => upload.into_inner(),
        Some(Err(errors)) => {
            warn!("Rejected results upload: {}", errors);
            return failed(Status::BadRequest, errors.to_string());
        }
        None => return failed(Status::BadRequest, MISSING_FILE),
    };
    let Some(file) = upload.file else {
        return failed(Status::BadRequest, MISSING_FILE);
    };

    let Some(tournament_id) = upload.tournament_id else {
        info!("{} uploaded a results file without a tournament", admin.user().email);
        return (Status::Ok, Json(json!({ "ok": true })));
    };
    if file.len() == 0 {
        return failed(Status::BadRequest, EMPTY_FILE);
    }

    let bytes = match read_file(&file).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Unable to read uploaded results: {}", e);
            return failed(Status::BadRequest, "Could not read the uploaded file.");
        }
    };
    let imported = match results::parse_results(bytes.as_slice()) {
        Ok(rows) => results::import_results(db.inner(), tournament_id, rows).await,
        Err(e) => Err(e),
    };

    match imported {
        Ok(summary) => (
            Status::Ok,
            Json(json!({
                "ok": true,
                "imported": summary.imported,
                "unmatched": summary.unmatched,
            })),
        ),
        Err(e) => failed(e.status(), e.to_string()),
    }
}
