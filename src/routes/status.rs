// src/routes/status.rs

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;

use super::internal_error;
use crate::models::StatusCheckOutcome;
use crate::notify::{push_to_all_subscribed, record_audit, PushPayload};
use crate::settings::get_settings;
use crate::status::check_and_update_statuses;
use crate::AppState;

type RouteError = (StatusCode, String);

/// Run one reconciliation pass now. Coordinators with a push subscription
/// hear about it whenever anything actually changed.
pub async fn status_check(
    State(state): State<AppState>,
) -> Result<Json<StatusCheckOutcome>, RouteError> {
    let today = Local::now().date_naive();
    let outcome = check_and_update_statuses(state.store.as_ref(), today)
        .await
        .map_err(internal_error)?;

    if outcome.updated > 0 {
        let message = format!("Automatycznie wymeldowano: {}", outcome.updated);
        record_audit(state.store.as_ref(), "system", "status.check", "", message.clone()).await;
        if let Ok(settings) = get_settings(state.store.as_ref()).await {
            let payload = PushPayload::new("SmartHouse", message);
            push_to_all_subscribed(state.notifier.as_ref(), &settings, &payload).await;
        }
    }

    Ok(Json(outcome))
}
