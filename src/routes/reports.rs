// src/routes/reports.rs

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::internal_error;
use crate::reports::{monthly_report, MonthlyReport};
use crate::AppState;

type RouteError = (StatusCode, String);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyQuery {
    pub year: i32,
    pub month: u32,
    pub coordinator_id: Option<String>,
}

pub async fn monthly(
    State(state): State<AppState>,
    Query(q): Query<MonthlyQuery>,
) -> Result<Json<MonthlyReport>, RouteError> {
    let report = monthly_report(
        state.store.as_ref(),
        q.year,
        q.month,
        q.coordinator_id.as_deref(),
    )
    .await
    .map_err(internal_error)?;
    match report {
        Some(report) => Ok(Json(report)),
        None => Err((
            StatusCode::BAD_REQUEST,
            format!("invalid month {}-{}", q.year, q.month),
        )),
    }
}
