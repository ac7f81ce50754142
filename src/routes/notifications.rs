// src/routes/notifications.rs

//! Read side of the notification and audit sheets. Both grow without bound,
//! so the listings page with the usual limit/offset clamps.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::internal_error;
use crate::models::rows;
use crate::models::{AuditEntry, NotificationRecord};
use crate::store::sheets;
use crate::AppState;

type RouteError = (StatusCode, String);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsQuery {
    pub recipient_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Query(q): Query<NotificationsQuery>,
) -> Result<Json<Vec<NotificationRecord>>, RouteError> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0);

    let records = state
        .store
        .get_rows(sheets::NOTIFICATIONS)
        .await
        .map_err(internal_error)?;
    let mut notifications: Vec<NotificationRecord> = records
        .iter()
        .map(rows::notification_from_row)
        .filter(|n| match &q.recipient_id {
            Some(recipient) => &n.recipient_id == recipient,
            None => true,
        })
        .collect();
    // newest first
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let page = notifications.into_iter().skip(offset).take(limit).collect();
    Ok(Json(page))
}

#[derive(Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn list_audit(
    State(state): State<AppState>,
    Query(q): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, RouteError> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0);

    let records = state
        .store
        .get_rows(sheets::AUDIT_LOG)
        .await
        .map_err(internal_error)?;
    let mut entries: Vec<AuditEntry> = records.iter().map(rows::audit_from_row).collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let page = entries.into_iter().skip(offset).take(limit).collect();
    Ok(Json(page))
}
