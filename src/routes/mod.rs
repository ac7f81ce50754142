// src/routes/mod.rs

use axum::http::StatusCode;

use crate::store::StoreError;

pub mod addresses;
pub mod auth;
pub mod equipment;
pub mod health;
pub mod import;
pub mod inspections;
pub mod notifications;
pub mod occupancy;
pub mod reports;
pub mod residents;
pub mod settings;
pub mod status;

// Common error mapper
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

/// Store errors map to 404 for unknown rows and 500 for everything else.
pub fn store_error(e: StoreError) -> (StatusCode, String) {
    if e.is_not_found() {
        (StatusCode::NOT_FOUND, e.to_string())
    } else {
        internal_error(e)
    }
}
