// src/routes/import.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::internal_error;
use crate::import::run_import;
use crate::models::rows;
use crate::models::{ImportReport, ImportStatusRecord, ResidentKind};
use crate::store::sheets;
use crate::AppState;

type RouteError = (StatusCode, String);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBody {
    pub file_base64: String,
    pub file_name: Option<String>,
    pub actor_name: Option<String>,
}

async fn import_core(
    state: AppState,
    kind: ResidentKind,
    b: ImportBody,
) -> Result<Json<ImportReport>, RouteError> {
    let file_name = b.file_name.unwrap_or_else(|| "import.xlsx".to_string());
    let actor = b.actor_name.unwrap_or_else(|| "system".to_string());
    let report = run_import(state.store.as_ref(), kind, &b.file_base64, &file_name, &actor)
        .await
        .map_err(internal_error)?;
    Ok(Json(report))
}

pub async fn import_employees(
    State(state): State<AppState>,
    Json(b): Json<ImportBody>,
) -> Result<Json<ImportReport>, RouteError> {
    import_core(state, ResidentKind::Employee, b).await
}

pub async fn import_non_employees(
    State(state): State<AppState>,
    Json(b): Json<ImportBody>,
) -> Result<Json<ImportReport>, RouteError> {
    import_core(state, ResidentKind::NonEmployee, b).await
}

pub async fn import_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<ImportStatusRecord>, RouteError> {
    let records = state
        .store
        .get_rows(sheets::IMPORT_STATUS)
        .await
        .map_err(internal_error)?;
    records
        .iter()
        .find(|r| r.get(rows::COL_ID).map(String::as_str) == Some(job_id.as_str()))
        .map(|r| Json(rows::import_status_from_row(r)))
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no import job {job_id}")))
}
