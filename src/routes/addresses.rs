// src/routes/addresses.rs

//! Addresses and their rooms. Rooms live in their own sheet keyed by
//! `addressId`; the API nests them in the address payloads and a PATCH may
//! replace the whole room list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{internal_error, store_error};
use crate::actions;
use crate::models::rows::{self, address_to_row, room_to_row};
use crate::models::{Address, Deleted, Room};
use crate::notify::record_audit;
use crate::store::sheets;
use crate::AppState;

type RouteError = (StatusCode, String);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBody {
    pub id: Option<String>,
    pub name: String,
    pub capacity: u32,
    pub is_active: Option<bool>,
    pub is_locked: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressBody {
    pub name: String,
    pub locality: String,
    pub coordinator_ids: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub rooms: Option<Vec<RoomBody>>,
    pub actor_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchAddressBody {
    pub name: Option<String>,
    pub locality: Option<String>,
    pub coordinator_ids: Option<Vec<String>>,
    pub is_active: Option<bool>,
    /// When present, replaces the address's room list wholesale.
    pub rooms: Option<Vec<RoomBody>>,
    pub actor_name: Option<String>,
}

fn room_from_body(address_id: &str, b: RoomBody) -> Room {
    Room {
        id: b.id.filter(|v| !v.is_empty()).unwrap_or_else(|| Uuid::new_v4().to_string()),
        address_id: address_id.to_string(),
        name: b.name,
        capacity: b.capacity,
        is_active: b.is_active.unwrap_or(true),
        is_locked: b.is_locked.unwrap_or(false),
    }
}

async fn replace_rooms(
    state: &AppState,
    address_id: &str,
    bodies: Vec<RoomBody>,
) -> Result<Vec<Room>, RouteError> {
    state
        .store
        .delete_rows(sheets::ROOMS, rows::COL_ADDRESS_ID, address_id)
        .await
        .map_err(internal_error)?;
    let mut rooms = Vec::with_capacity(bodies.len());
    for body in bodies {
        let room = room_from_body(address_id, body);
        state
            .store
            .add_row(sheets::ROOMS, room_to_row(&room))
            .await
            .map_err(internal_error)?;
        rooms.push(room);
    }
    Ok(rooms)
}

pub async fn list_addresses(State(state): State<AppState>) -> Result<Json<Vec<Address>>, RouteError> {
    let addresses = actions::load_addresses(state.store.as_ref())
        .await
        .map_err(internal_error)?;
    Ok(Json(addresses))
}

pub async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Address>, RouteError> {
    let address = actions::find_address(state.store.as_ref(), &id)
        .await
        .map_err(store_error)?;
    Ok(Json(address))
}

pub async fn create_address(
    State(state): State<AppState>,
    Json(b): Json<CreateAddressBody>,
) -> Result<Json<Address>, RouteError> {
    let actor = b.actor_name.unwrap_or_else(|| "system".to_string());
    let mut address = Address {
        id: Uuid::new_v4().to_string(),
        name: b.name.trim().to_string(),
        locality: b.locality.trim().to_string(),
        coordinator_ids: b.coordinator_ids.unwrap_or_default(),
        is_active: b.is_active.unwrap_or(true),
        rooms: Vec::new(),
    };
    state
        .store
        .add_row(sheets::ADDRESSES, address_to_row(&address))
        .await
        .map_err(internal_error)?;
    if let Some(rooms) = b.rooms {
        address.rooms = replace_rooms(&state, &address.id, rooms).await?;
    }
    record_audit(
        state.store.as_ref(),
        &actor,
        "addresses.create",
        &address.id,
        address.name.clone(),
    )
    .await;
    Ok(Json(address))
}

pub async fn patch_address(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<PatchAddressBody>,
) -> Result<Json<Address>, RouteError> {
    let actor = b.actor_name.clone().unwrap_or_else(|| "system".to_string());
    let mut address = actions::find_address(state.store.as_ref(), &id)
        .await
        .map_err(store_error)?;

    if let Some(v) = b.name {
        address.name = v.trim().to_string();
    }
    if let Some(v) = b.locality {
        address.locality = v.trim().to_string();
    }
    if let Some(v) = b.coordinator_ids {
        address.coordinator_ids = v;
    }
    if let Some(v) = b.is_active {
        address.is_active = v;
    }
    state
        .store
        .update_row(sheets::ADDRESSES, rows::COL_ID, &id, address_to_row(&address))
        .await
        .map_err(store_error)?;
    if let Some(rooms) = b.rooms {
        address.rooms = replace_rooms(&state, &id, rooms).await?;
    }
    record_audit(
        state.store.as_ref(),
        &actor,
        "addresses.update",
        &id,
        address.name.clone(),
    )
    .await;
    Ok(Json(address))
}

pub async fn delete_address(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, RouteError> {
    let removed = state
        .store
        .delete_rows(sheets::ADDRESSES, rows::COL_ID, &id)
        .await
        .map_err(internal_error)?;
    if removed == 0 {
        return Err((StatusCode::NOT_FOUND, format!("no address with id {id}")));
    }
    // rooms belong to the address and go with it
    state
        .store
        .delete_rows(sheets::ROOMS, rows::COL_ADDRESS_ID, &id)
        .await
        .map_err(internal_error)?;
    record_audit(state.store.as_ref(), "system", "addresses.delete", &id, String::new()).await;
    Ok(Json(Deleted { deleted: true }))
}
