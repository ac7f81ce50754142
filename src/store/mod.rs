// src/store/mod.rs

//! Row-store adapter: the spreadsheet-backed persistence contract.
//!
//! Each entity lives in a named sheet; a sheet is an ordered collection of
//! [`Record`]s, flat maps of column name to cell string. The trait mirrors
//! what the backing spreadsheet service offers: fetch all rows, append one or
//! many, and keyed update/single-cell/delete operations. Everything above this
//! layer works with typed structs via the codecs in `models::rows`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

pub mod json;

pub use json::JsonStore;

/// One sheet row: column name → cell value. Cells are always strings; an
/// absent value is an empty string, not a missing key.
pub type Record = BTreeMap<String, String>;

/// Sheet names, matching the tabs of the historical spreadsheet.
pub mod sheets {
    pub const EMPLOYEES: &str = "Employees";
    pub const NON_EMPLOYEES: &str = "NonEmployees";
    pub const BOK_RESIDENTS: &str = "BokResidents";
    pub const ADDRESSES: &str = "Addresses";
    pub const ROOMS: &str = "Rooms";
    pub const NOTIFICATIONS: &str = "Powiadomienia";
    pub const AUDIT_LOG: &str = "AuditLog";
    pub const SETTINGS: &str = "Settings";
    pub const IMPORT_STATUS: &str = "ImportStatus";
    pub const ADDRESS_HISTORY: &str = "AddressHistory";
    pub const INSPECTIONS: &str = "Inspections";
    pub const EQUIPMENT: &str = "Equipment";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no row in `{sheet}` where {key} = `{value}`")]
    RowNotFound {
        sheet: String,
        key: String,
        value: String,
    },
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(sheet: &str, key: &str, value: &str) -> Self {
        StoreError::RowNotFound {
            sheet: sheet.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::RowNotFound { .. })
    }
}

/// The row-store contract. All calls are asynchronous I/O against the backing
/// sheet; writes are last-write-wins with no optimistic concurrency.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// All rows of a sheet, in sheet order. An unknown sheet is an empty one.
    async fn get_rows(&self, sheet: &str) -> Result<Vec<Record>, StoreError>;

    /// Append a single row.
    async fn add_row(&self, sheet: &str, record: Record) -> Result<(), StoreError>;

    /// Append many rows in one write. The import pipeline depends on this
    /// being a single call, not a loop of `add_row`.
    async fn add_rows(&self, sheet: &str, records: Vec<Record>) -> Result<(), StoreError>;

    /// Replace the first row where `key` equals `value`.
    async fn update_row(
        &self,
        sheet: &str,
        key: &str,
        value: &str,
        record: Record,
    ) -> Result<(), StoreError>;

    /// Write one cell of the first row where `key` equals `value`, leaving the
    /// rest of the row untouched (the `set(...); save()` idiom of the backing
    /// sheet; legacy cells keep their original formatting).
    async fn set_cell(
        &self,
        sheet: &str,
        key: &str,
        value: &str,
        column: &str,
        cell: &str,
    ) -> Result<(), StoreError>;

    /// Delete every row where `key` equals `value`; returns how many went.
    async fn delete_rows(&self, sheet: &str, key: &str, value: &str)
        -> Result<usize, StoreError>;
}
