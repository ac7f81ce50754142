// src/routes/equipment.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{internal_error, store_error};
use crate::models::rows::{self, equipment_to_row};
use crate::models::{Deleted, EquipmentItem};
use crate::store::sheets;
use crate::AppState;

type RouteError = (StatusCode, String);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentBody {
    pub address: String,
    pub room_number: Option<String>,
    pub name: String,
    pub quantity: Option<u32>,
    pub condition: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchEquipmentBody {
    pub address: Option<String>,
    pub room_number: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub condition: Option<String>,
    pub notes: Option<String>,
}

pub async fn list_equipment(
    State(state): State<AppState>,
) -> Result<Json<Vec<EquipmentItem>>, RouteError> {
    let records = state
        .store
        .get_rows(sheets::EQUIPMENT)
        .await
        .map_err(internal_error)?;
    Ok(Json(records.iter().map(rows::equipment_from_row).collect()))
}

pub async fn create_equipment(
    State(state): State<AppState>,
    Json(b): Json<CreateEquipmentBody>,
) -> Result<Json<EquipmentItem>, RouteError> {
    let item = EquipmentItem {
        id: Uuid::new_v4().to_string(),
        address: b.address,
        room_number: b.room_number.unwrap_or_default(),
        name: b.name,
        quantity: b.quantity.unwrap_or(1),
        condition: b.condition.unwrap_or_default(),
        notes: b.notes.unwrap_or_default(),
    };
    state
        .store
        .add_row(sheets::EQUIPMENT, equipment_to_row(&item))
        .await
        .map_err(internal_error)?;
    Ok(Json(item))
}

pub async fn patch_equipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<PatchEquipmentBody>,
) -> Result<Json<EquipmentItem>, RouteError> {
    let records = state
        .store
        .get_rows(sheets::EQUIPMENT)
        .await
        .map_err(internal_error)?;
    let mut item = records
        .iter()
        .find(|r| r.get(rows::COL_ID).map(String::as_str) == Some(id.as_str()))
        .map(rows::equipment_from_row)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no equipment with id {id}")))?;

    if let Some(v) = b.address {
        item.address = v;
    }
    if let Some(v) = b.room_number {
        item.room_number = v;
    }
    if let Some(v) = b.name {
        item.name = v;
    }
    if let Some(v) = b.quantity {
        item.quantity = v;
    }
    if let Some(v) = b.condition {
        item.condition = v;
    }
    if let Some(v) = b.notes {
        item.notes = v;
    }
    state
        .store
        .update_row(sheets::EQUIPMENT, rows::COL_ID, &id, equipment_to_row(&item))
        .await
        .map_err(store_error)?;
    Ok(Json(item))
}

pub async fn delete_equipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, RouteError> {
    let removed = state
        .store
        .delete_rows(sheets::EQUIPMENT, rows::COL_ID, &id)
        .await
        .map_err(internal_error)?;
    Ok(Json(Deleted { deleted: removed > 0 }))
}
