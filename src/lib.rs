// src/lib.rs

//! SmartHouse backend: employee housing management over a sheet-shaped row
//! store. The HTTP surface lives under `/api/v1`; the engines (status
//! reconciliation, Excel import, occupancy, reports) are plain modules the
//! routes delegate to.

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;

pub mod actions;
pub mod dates;
pub mod import;
pub mod models;
pub mod notify;
pub mod occupancy;
pub mod reports;
pub mod routes;
pub mod settings;
pub mod status;
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn store::SheetStore>,
    pub notifier: Arc<dyn notify::Notifier>,
}

/// Build the API router. Middleware (CORS, tracing) is layered on by the
/// binary; tests drive this router directly.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // health
        .route("/health", get(routes::health::health))
        // auth
        .route("/api/v1/auth/login", post(routes::auth::login))
        .route("/api/v1/auth/subscribe", post(routes::auth::subscribe))
        // employees
        .route(
            "/api/v1/employees",
            post(routes::residents::create_employee).get(routes::residents::list_employees),
        )
        .route(
            "/api/v1/employees/:id",
            get(routes::residents::get_employee)
                .patch(routes::residents::patch_employee)
                .delete(routes::residents::delete_employee),
        )
        .route(
            "/api/v1/employees/:id/history",
            get(routes::residents::employee_history),
        )
        // non-employees
        .route(
            "/api/v1/non-employees",
            post(routes::residents::create_non_employee).get(routes::residents::list_non_employees),
        )
        .route(
            "/api/v1/non-employees/:id",
            get(routes::residents::get_non_employee)
                .patch(routes::residents::patch_non_employee)
                .delete(routes::residents::delete_non_employee),
        )
        // BOK residents
        .route(
            "/api/v1/bok-residents",
            post(routes::residents::create_bok_resident).get(routes::residents::list_bok_residents),
        )
        .route(
            "/api/v1/bok-residents/:id",
            get(routes::residents::get_bok_resident)
                .patch(routes::residents::patch_bok_resident)
                .delete(routes::residents::delete_bok_resident),
        )
        // addresses (rooms nested in payloads)
        .route(
            "/api/v1/addresses",
            post(routes::addresses::create_address).get(routes::addresses::list_addresses),
        )
        .route(
            "/api/v1/addresses/:id",
            get(routes::addresses::get_address)
                .patch(routes::addresses::patch_address)
                .delete(routes::addresses::delete_address),
        )
        // settings
        .route(
            "/api/v1/settings",
            get(routes::settings::get_settings).put(routes::settings::put_settings),
        )
        // status reconciliation
        .route("/api/v1/status-check", post(routes::status::status_check))
        // excel import
        .route("/api/v1/import/employees", post(routes::import::import_employees))
        .route(
            "/api/v1/import/non-employees",
            post(routes::import::import_non_employees),
        )
        .route("/api/v1/import-status/:job_id", get(routes::import::import_status))
        // occupancy & reports
        .route("/api/v1/occupancy", get(routes::occupancy::occupancy))
        .route("/api/v1/occupancy/summary", get(routes::occupancy::occupancy_summary))
        .route("/api/v1/reports/monthly", get(routes::reports::monthly))
        // notifications & audit
        .route(
            "/api/v1/notifications",
            get(routes::notifications::list_notifications),
        )
        .route("/api/v1/audit", get(routes::notifications::list_audit))
        // inspections
        .route(
            "/api/v1/inspections",
            post(routes::inspections::create_inspection).get(routes::inspections::list_inspections),
        )
        .route(
            "/api/v1/inspections/:id",
            patch(routes::inspections::patch_inspection)
                .delete(routes::inspections::delete_inspection),
        )
        // equipment
        .route(
            "/api/v1/equipment",
            post(routes::equipment::create_equipment).get(routes::equipment::list_equipment),
        )
        .route(
            "/api/v1/equipment/:id",
            patch(routes::equipment::patch_equipment).delete(routes::equipment::delete_equipment),
        )
        .with_state(state)
}
