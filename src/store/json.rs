// src/store/json.rs

//! JSON-file-backed implementation of the [`SheetStore`] contract.
//!
//! The whole store is one JSON document mapping sheet name to row list, loaded
//! at startup and rewritten after every mutation while the write lock is held,
//! which serializes concurrent writers the same way the backing spreadsheet
//! service does. `in_memory` skips the file entirely and doubles as the test
//! fixture.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::{Record, SheetStore, StoreError};

type Sheets = HashMap<String, Vec<Record>>;

pub struct JsonStore {
    path: Option<PathBuf>,
    sheets: RwLock<Sheets>,
}

impl JsonStore {
    /// Volatile store, used by tests and by runs without a configured data file.
    pub fn in_memory() -> Self {
        JsonStore {
            path: None,
            sheets: RwLock::new(Sheets::new()),
        }
    }

    /// Open (or create) a file-backed store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let sheets = if path.exists() {
            let raw = tokio::fs::read(&path).await?;
            serde_json::from_slice(&raw)?
        } else {
            Sheets::new()
        };
        info!("sheet store at {}", path.display());
        Ok(JsonStore {
            path: Some(path),
            sheets: RwLock::new(sheets),
        })
    }

    async fn persist(&self, sheets: &Sheets) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            let raw = serde_json::to_vec_pretty(sheets)?;
            tokio::fs::write(path, raw).await?;
        }
        Ok(())
    }
}

fn position(rows: &[Record], key: &str, value: &str) -> Option<usize> {
    rows.iter()
        .position(|r| r.get(key).map(String::as_str) == Some(value))
}

#[async_trait]
impl SheetStore for JsonStore {
    async fn get_rows(&self, sheet: &str) -> Result<Vec<Record>, StoreError> {
        let sheets = self.sheets.read().await;
        Ok(sheets.get(sheet).cloned().unwrap_or_default())
    }

    async fn add_row(&self, sheet: &str, record: Record) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write().await;
        sheets.entry(sheet.to_string()).or_default().push(record);
        self.persist(&sheets).await
    }

    async fn add_rows(&self, sheet: &str, records: Vec<Record>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut sheets = self.sheets.write().await;
        sheets.entry(sheet.to_string()).or_default().extend(records);
        self.persist(&sheets).await
    }

    async fn update_row(
        &self,
        sheet: &str,
        key: &str,
        value: &str,
        record: Record,
    ) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write().await;
        let rows = sheets.entry(sheet.to_string()).or_default();
        let Some(idx) = position(rows, key, value) else {
            return Err(StoreError::not_found(sheet, key, value));
        };
        rows[idx] = record;
        self.persist(&sheets).await
    }

    async fn set_cell(
        &self,
        sheet: &str,
        key: &str,
        value: &str,
        column: &str,
        cell: &str,
    ) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write().await;
        let rows = sheets.entry(sheet.to_string()).or_default();
        let Some(idx) = position(rows, key, value) else {
            return Err(StoreError::not_found(sheet, key, value));
        };
        rows[idx].insert(column.to_string(), cell.to_string());
        self.persist(&sheets).await
    }

    async fn delete_rows(
        &self,
        sheet: &str,
        key: &str,
        value: &str,
    ) -> Result<usize, StoreError> {
        let mut sheets = self.sheets.write().await;
        let rows = sheets.entry(sheet.to_string()).or_default();
        let before = rows.len();
        rows.retain(|r| r.get(key).map(String::as_str) != Some(value));
        let removed = before - rows.len();
        if removed > 0 {
            self.persist(&sheets).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn unknown_sheet_is_empty() {
        let store = JsonStore::in_memory();
        assert!(store.get_rows("Employees").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_update_delete_round_trip() {
        let store = JsonStore::in_memory();
        store
            .add_row("Employees", rec(&[("id", "e1"), ("status", "active")]))
            .await
            .unwrap();
        store
            .add_rows(
                "Employees",
                vec![rec(&[("id", "e2")]), rec(&[("id", "e3")])],
            )
            .await
            .unwrap();
        assert_eq!(store.get_rows("Employees").await.unwrap().len(), 3);

        store
            .set_cell("Employees", "id", "e1", "status", "dismissed")
            .await
            .unwrap();
        let rows = store.get_rows("Employees").await.unwrap();
        assert_eq!(rows[0]["status"], "dismissed");

        store
            .update_row("Employees", "id", "e2", rec(&[("id", "e2"), ("status", "active")]))
            .await
            .unwrap();

        assert_eq!(
            store.delete_rows("Employees", "id", "e3").await.unwrap(),
            1
        );
        assert_eq!(store.get_rows("Employees").await.unwrap().len(), 2);
        assert_eq!(
            store.delete_rows("Employees", "id", "missing").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn keyed_ops_report_missing_rows() {
        let store = JsonStore::in_memory();
        let err = store
            .set_cell("Employees", "id", "ghost", "status", "dismissed")
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = store
            .update_row("Employees", "id", "ghost", Record::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheets.json");

        let store = JsonStore::open(&path).await.unwrap();
        store
            .add_row("Addresses", rec(&[("id", "a1"), ("name", "Polna 2")]))
            .await
            .unwrap();
        drop(store);

        let reopened = JsonStore::open(&path).await.unwrap();
        let rows = reopened.get_rows("Addresses").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Polna 2");
    }
}
