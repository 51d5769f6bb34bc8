//! Administrative endpoint that runs a spreadsheet import.

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, post};
use rocket_okapi::openapi;

use crate::auth::{BearerToken, SharedAuthorizer};
use crate::import::{ImportConfig, ImportError, ImportPipeline, ImportResult, SharedSheetSource};
use crate::store::SharedStore;

/// Fetch the configured spreadsheet and reconcile it into the content tree.
///
/// A batch that started row processing always answers 200 with a report, even
/// if every row was skipped. Batch-level failures carry a single `error`.
#[openapi(tag = "Admin")]
#[post("/admin/import")]
pub async fn import_problems(
    token: BearerToken,
    config: &State<ImportConfig>,
    store: &State<SharedStore>,
    authorizer: &State<SharedAuthorizer>,
    source: &State<SharedSheetSource>,
) -> status::Custom<Json<ImportResult>> {
    let outcome = ImportPipeline::new(
        config.inner(),
        store.inner().as_ref(),
        authorizer.inner().as_ref(),
        source.inner().as_ref(),
    )
    .run(token.as_deref())
    .await;

    let status = match &outcome {
        Ok(_) => Status::Ok,
        Err(err) => {
            log::warn!("import aborted: {}", err);
            fatal_status(err)
        }
    };

    status::Custom(status, Json(ImportResult::from(outcome)))
}

fn fatal_status(err: &ImportError) -> Status {
    match err {
        ImportError::Unauthorized => Status::Unauthorized,
        ImportError::NotConfigured => Status::ServiceUnavailable,
        ImportError::Fetch(_) | ImportError::FetchStatus(_) => Status::BadGateway,
        ImportError::Parse(_) | ImportError::Empty | ImportError::MissingColumn(_) => {
            Status::UnprocessableEntity
        }
        ImportError::Store(_) => Status::InternalServerError,
    }
}
