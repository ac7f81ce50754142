// src/routes/residents.rs

//! CRUD for the three resident collections. The handlers share one
//! kind-parameterized core; the router binds thin per-kind wrappers.
//! Mutations append audit entries, notify the resident's coordinator and,
//! for employees, maintain the address history trail.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::{internal_error, store_error};
use crate::dates::now_stamp;
use crate::models::rows::{self, diff_records, history_to_row, resident_from_row, resident_to_row};
use crate::models::{
    AddressHistoryRecord, Deleted, FieldChange, Resident, ResidentKind, ResidentStatus,
};
use crate::notify::{push_to_coordinator, record_audit, record_notification, PushPayload};
use crate::settings::get_settings;
use crate::store::sheets;
use crate::AppState;

type RouteError = (StatusCode, String);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResidentBody {
    pub first_name: String,
    pub last_name: String,
    pub coordinator_id: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub room_number: Option<String>,
    pub zaklad: Option<String>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub dismiss_date: Option<NaiveDate>,
    pub comments: Option<String>,
    #[serde(rename = "paymentTypeNZ")]
    pub payment_type_nz: Option<String>,
    pub amount: Option<String>,
    pub bok_status: Option<String>,
    pub bok_role: Option<String>,
    pub bok_return_option: Option<String>,
    pub actor_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchResidentBody {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub coordinator_id: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub room_number: Option<String>,
    pub zaklad: Option<String>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub dismiss_date: Option<NaiveDate>,
    pub status: Option<ResidentStatus>,
    pub comments: Option<String>,
    #[serde(rename = "paymentTypeNZ")]
    pub payment_type_nz: Option<String>,
    pub amount: Option<String>,
    pub bok_status: Option<String>,
    pub bok_role: Option<String>,
    pub bok_return_option: Option<String>,
    pub actor_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorQuery {
    pub actor_name: Option<String>,
}

fn actor_or_system(actor: Option<String>) -> String {
    actor.filter(|a| !a.trim().is_empty()).unwrap_or_else(|| "system".to_string())
}

async fn append_history(store: &dyn crate::store::SheetStore, resident: &Resident) {
    let record = AddressHistoryRecord {
        id: Uuid::new_v4().to_string(),
        employee_id: resident.id.clone(),
        address: resident.address.clone(),
        room_number: resident.room_number.clone(),
        changed_at: now_stamp(),
    };
    if let Err(err) = store
        .add_row(sheets::ADDRESS_HISTORY, history_to_row(&record))
        .await
    {
        tracing::warn!(error = %err, "failed to append address history");
    }
}

async fn notify_coordinator(
    state: &AppState,
    resident: &Resident,
    message: String,
    changes: Vec<FieldChange>,
) {
    if resident.coordinator_id.is_empty() {
        return;
    }
    record_notification(
        state.store.as_ref(),
        &resident.coordinator_id,
        message.clone(),
        changes,
    )
    .await;
    if let Ok(settings) = get_settings(state.store.as_ref()).await {
        let mut payload = PushPayload::new("SmartHouse", message);
        payload.data = serde_json::json!({ "id": resident.id });
        push_to_coordinator(
            state.notifier.as_ref(),
            &settings,
            &resident.coordinator_id,
            &payload,
        )
        .await;
    }
}

// ───────────────────────────────────────
// Kind-parameterized core
// ───────────────────────────────────────

async fn list_core(state: AppState, kind: ResidentKind) -> Result<Json<Vec<Resident>>, RouteError> {
    let residents = crate::actions::load_residents(state.store.as_ref(), kind)
        .await
        .map_err(internal_error)?;
    Ok(Json(residents))
}

async fn get_core(state: AppState, kind: ResidentKind, id: String) -> Result<Json<Resident>, RouteError> {
    let resident = crate::actions::find_resident(state.store.as_ref(), kind, &id)
        .await
        .map_err(store_error)?;
    Ok(Json(resident))
}

async fn create_core(
    state: AppState,
    kind: ResidentKind,
    b: CreateResidentBody,
) -> Result<Json<Resident>, RouteError> {
    let actor = actor_or_system(b.actor_name);
    let mut resident = Resident {
        id: Uuid::new_v4().to_string(),
        first_name: b.first_name.trim().to_string(),
        last_name: b.last_name.trim().to_string(),
        coordinator_id: b.coordinator_id.unwrap_or_default(),
        nationality: b.nationality.unwrap_or_default(),
        gender: b.gender.unwrap_or_default(),
        address: b.address.unwrap_or_default(),
        room_number: b.room_number.unwrap_or_default(),
        zaklad: b.zaklad.unwrap_or_default(),
        check_in_date: b.check_in_date,
        check_out_date: b.check_out_date,
        dismiss_date: b.dismiss_date,
        status: ResidentStatus::Active,
        comments: b.comments.unwrap_or_default(),
        payment_type_nz: b.payment_type_nz.unwrap_or_default(),
        amount: b.amount.unwrap_or_default(),
        bok_status: b.bok_status.unwrap_or_default(),
        bok_role: b.bok_role.unwrap_or_default(),
        bok_return_option: b.bok_return_option.unwrap_or_default(),
        ..Resident::default()
    };
    resident.full_name = resident.derived_full_name();

    state
        .store
        .add_row(kind.sheet(), resident_to_row(&resident))
        .await
        .map_err(internal_error)?;

    if kind == ResidentKind::Employee && !(resident.address.is_empty() && resident.room_number.is_empty()) {
        append_history(state.store.as_ref(), &resident).await;
    }
    record_audit(
        state.store.as_ref(),
        &actor,
        &format!("{}.create", kind.scope()),
        &resident.id,
        resident.full_name.clone(),
    )
    .await;
    notify_coordinator(
        &state,
        &resident,
        format!("Dodano mieszkańca: {}", resident.full_name),
        Vec::new(),
    )
    .await;

    Ok(Json(resident))
}

async fn patch_core(
    state: AppState,
    kind: ResidentKind,
    id: String,
    b: PatchResidentBody,
) -> Result<Json<Resident>, RouteError> {
    let actor = actor_or_system(b.actor_name);
    let records = state.store.get_rows(kind.sheet()).await.map_err(internal_error)?;
    let before = records
        .iter()
        .find(|r| r.get(rows::COL_ID).map(String::as_str) == Some(id.as_str()))
        .cloned()
        .ok_or_else(|| store_error(crate::store::StoreError::not_found(kind.sheet(), rows::COL_ID, &id)))?;

    let mut resident = resident_from_row(&before);
    if let Some(v) = b.first_name {
        resident.first_name = v.trim().to_string();
    }
    if let Some(v) = b.last_name {
        resident.last_name = v.trim().to_string();
    }
    if let Some(v) = b.coordinator_id {
        resident.coordinator_id = v;
    }
    if let Some(v) = b.nationality {
        resident.nationality = v;
    }
    if let Some(v) = b.gender {
        resident.gender = v;
    }
    if let Some(v) = b.address {
        resident.address = v;
    }
    if let Some(v) = b.room_number {
        resident.room_number = v;
    }
    if let Some(v) = b.zaklad {
        resident.zaklad = v;
    }
    if let Some(v) = b.check_in_date {
        resident.check_in_date = Some(v);
    }
    if let Some(v) = b.check_out_date {
        resident.check_out_date = Some(v);
    }
    if let Some(v) = b.dismiss_date {
        resident.dismiss_date = Some(v);
    }
    if let Some(v) = b.status {
        resident.status = v;
    }
    if let Some(v) = b.comments {
        resident.comments = v;
    }
    if let Some(v) = b.payment_type_nz {
        resident.payment_type_nz = v;
    }
    if let Some(v) = b.amount {
        resident.amount = v;
    }
    if let Some(v) = b.bok_status {
        resident.bok_status = v;
    }
    if let Some(v) = b.bok_role {
        resident.bok_role = v;
    }
    if let Some(v) = b.bok_return_option {
        resident.bok_return_option = v;
    }
    resident.full_name = resident.derived_full_name();

    let after = resident_to_row(&resident);
    state
        .store
        .update_row(kind.sheet(), rows::COL_ID, &id, after.clone())
        .await
        .map_err(store_error)?;

    let changes = diff_records(&before, &after);
    let housing_changed = changes
        .iter()
        .any(|c| c.field == "address" || c.field == "roomNumber");
    if kind == ResidentKind::Employee && housing_changed {
        append_history(state.store.as_ref(), &resident).await;
    }
    if !changes.is_empty() {
        record_audit(
            state.store.as_ref(),
            &actor,
            &format!("{}.update", kind.scope()),
            &resident.id,
            changes
                .iter()
                .map(|c| c.field.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
        .await;
        notify_coordinator(
            &state,
            &resident,
            format!("Zaktualizowano mieszkańca: {}", resident.full_name),
            changes,
        )
        .await;
    }

    Ok(Json(resident))
}

async fn delete_core(
    state: AppState,
    kind: ResidentKind,
    id: String,
    actor: Option<String>,
) -> Result<Json<Deleted>, RouteError> {
    let actor = actor_or_system(actor);
    let removed = state
        .store
        .delete_rows(kind.sheet(), rows::COL_ID, &id)
        .await
        .map_err(internal_error)?;
    if removed == 0 {
        return Err((StatusCode::NOT_FOUND, format!("no resident with id {id}")));
    }

    if kind == ResidentKind::Employee {
        // history rows belong to the employee and go with it
        state
            .store
            .delete_rows(sheets::ADDRESS_HISTORY, rows::COL_EMPLOYEE_ID, &id)
            .await
            .map_err(internal_error)?;
    }
    record_audit(
        state.store.as_ref(),
        &actor,
        &format!("{}.delete", kind.scope()),
        &id,
        String::new(),
    )
    .await;

    Ok(Json(Deleted { deleted: true }))
}

// ───────────────────────────────────────
// Employees
// ───────────────────────────────────────

pub async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<Resident>>, RouteError> {
    list_core(state, ResidentKind::Employee).await
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Resident>, RouteError> {
    get_core(state, ResidentKind::Employee, id).await
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(b): Json<CreateResidentBody>,
) -> Result<Json<Resident>, RouteError> {
    create_core(state, ResidentKind::Employee, b).await
}

pub async fn patch_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<PatchResidentBody>,
) -> Result<Json<Resident>, RouteError> {
    patch_core(state, ResidentKind::Employee, id, b).await
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ActorQuery>,
) -> Result<Json<Deleted>, RouteError> {
    delete_core(state, ResidentKind::Employee, id, q.actor_name).await
}

pub async fn employee_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AddressHistoryRecord>>, RouteError> {
    let records = state
        .store
        .get_rows(sheets::ADDRESS_HISTORY)
        .await
        .map_err(internal_error)?;
    let mut history: Vec<AddressHistoryRecord> = records
        .iter()
        .filter(|r| r.get(rows::COL_EMPLOYEE_ID).map(String::as_str) == Some(id.as_str()))
        .map(rows::history_from_row)
        .collect();
    history.sort_by(|a, b| a.changed_at.cmp(&b.changed_at));
    Ok(Json(history))
}

// ───────────────────────────────────────
// Non-employees
// ───────────────────────────────────────

pub async fn list_non_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Resident>>, RouteError> {
    list_core(state, ResidentKind::NonEmployee).await
}

pub async fn get_non_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Resident>, RouteError> {
    get_core(state, ResidentKind::NonEmployee, id).await
}

pub async fn create_non_employee(
    State(state): State<AppState>,
    Json(b): Json<CreateResidentBody>,
) -> Result<Json<Resident>, RouteError> {
    create_core(state, ResidentKind::NonEmployee, b).await
}

pub async fn patch_non_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<PatchResidentBody>,
) -> Result<Json<Resident>, RouteError> {
    patch_core(state, ResidentKind::NonEmployee, id, b).await
}

pub async fn delete_non_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ActorQuery>,
) -> Result<Json<Deleted>, RouteError> {
    delete_core(state, ResidentKind::NonEmployee, id, q.actor_name).await
}

// ───────────────────────────────────────
// BOK residents
// ───────────────────────────────────────

pub async fn list_bok_residents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Resident>>, RouteError> {
    list_core(state, ResidentKind::Bok).await
}

pub async fn get_bok_resident(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Resident>, RouteError> {
    get_core(state, ResidentKind::Bok, id).await
}

pub async fn create_bok_resident(
    State(state): State<AppState>,
    Json(b): Json<CreateResidentBody>,
) -> Result<Json<Resident>, RouteError> {
    create_core(state, ResidentKind::Bok, b).await
}

pub async fn patch_bok_resident(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<PatchResidentBody>,
) -> Result<Json<Resident>, RouteError> {
    patch_core(state, ResidentKind::Bok, id, b).await
}

pub async fn delete_bok_resident(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ActorQuery>,
) -> Result<Json<Deleted>, RouteError> {
    delete_core(state, ResidentKind::Bok, id, q.actor_name).await
}
