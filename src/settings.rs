// src/settings.rs

//! The Settings singleton: one row in the `Settings` sheet keyed
//! `global-settings`, with every list-valued column JSON-encoded in its cell.
//! Updates are shallow merges: only the provided top-level keys replace the
//! stored ones.

use tracing::info;

use crate::models::{Coordinator, Settings, SettingsPatch};
use crate::store::{sheets, Record, SheetStore, StoreError};

pub const SETTINGS_ID: &str = "global-settings";

fn list_cell<T: serde::Serialize>(v: &T) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

fn parse_list<T: serde::de::DeserializeOwned>(s: &str) -> Vec<T> {
    serde_json::from_str(s).unwrap_or_default()
}

fn settings_to_row(s: &Settings) -> Record {
    let mut rec = Record::new();
    rec.insert("id".into(), SETTINGS_ID.into());
    rec.insert("coordinators".into(), list_cell(&s.coordinators));
    rec.insert("localities".into(), list_cell(&s.localities));
    rec.insert("departments".into(), list_cell(&s.departments));
    rec.insert("nationalities".into(), list_cell(&s.nationalities));
    rec.insert("genders".into(), list_cell(&s.genders));
    rec.insert("addresses".into(), list_cell(&s.addresses));
    rec.insert("paymentTypesNZ".into(), list_cell(&s.payment_types_nz));
    rec.insert("bokStatuses".into(), list_cell(&s.bok_statuses));
    rec.insert("bokRoles".into(), list_cell(&s.bok_roles));
    rec.insert("bokReturnOptions".into(), list_cell(&s.bok_return_options));
    rec
}

fn settings_from_row(rec: &Record) -> Settings {
    let cell = |col: &str| rec.get(col).map(String::as_str).unwrap_or("");
    Settings {
        coordinators: parse_list::<Coordinator>(cell("coordinators")),
        localities: parse_list(cell("localities")),
        departments: parse_list(cell("departments")),
        nationalities: parse_list(cell("nationalities")),
        genders: parse_list(cell("genders")),
        addresses: parse_list(cell("addresses")),
        payment_types_nz: parse_list(cell("paymentTypesNZ")),
        bok_statuses: parse_list(cell("bokStatuses")),
        bok_roles: parse_list(cell("bokRoles")),
        bok_return_options: parse_list(cell("bokReturnOptions")),
    }
}

/// Read the singleton; a missing row yields the defaults (all lists empty).
pub async fn get_settings(store: &dyn SheetStore) -> Result<Settings, StoreError> {
    let rows = store.get_rows(sheets::SETTINGS).await?;
    Ok(rows
        .iter()
        .find(|r| r.get("id").map(String::as_str) == Some(SETTINGS_ID))
        .map(settings_from_row)
        .unwrap_or_default())
}

/// Persist the full settings document, inserting the row on first write.
pub async fn save_settings(store: &dyn SheetStore, s: &Settings) -> Result<(), StoreError> {
    let row = settings_to_row(s);
    match store
        .update_row(sheets::SETTINGS, "id", SETTINGS_ID, row.clone())
        .await
    {
        Err(e) if e.is_not_found() => store.add_row(sheets::SETTINGS, row).await,
        other => other,
    }
}

/// Shallow-merge `patch` into the stored settings and return the result.
pub async fn update_settings(
    store: &dyn SheetStore,
    patch: SettingsPatch,
) -> Result<Settings, StoreError> {
    let mut current = get_settings(store).await?;
    current.merge(patch);
    save_settings(store, &current).await?;
    Ok(current)
}

/// Seed the settings row at startup so the UI always has something to read.
pub async fn ensure_settings(store: &dyn SheetStore) -> Result<(), StoreError> {
    let rows = store.get_rows(sheets::SETTINGS).await?;
    let present = rows
        .iter()
        .any(|r| r.get("id").map(String::as_str) == Some(SETTINGS_ID));
    if !present {
        info!("seeding default settings row");
        save_settings(store, &Settings::default()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;

    #[tokio::test]
    async fn missing_row_yields_defaults() {
        let store = JsonStore::in_memory();
        let s = get_settings(&store).await.unwrap();
        assert!(s.coordinators.is_empty());
        assert!(s.localities.is_empty());
    }

    #[tokio::test]
    async fn merge_replaces_only_provided_keys() {
        let store = JsonStore::in_memory();
        save_settings(
            &store,
            &Settings {
                localities: vec!["Poznań".into()],
                departments: vec!["Produkcja".into()],
                ..Settings::default()
            },
        )
        .await
        .unwrap();

        let merged = update_settings(
            &store,
            SettingsPatch {
                localities: Some(vec!["Poznań".into(), "Luboń".into()]),
                ..SettingsPatch::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(merged.localities, vec!["Poznań".to_string(), "Luboń".to_string()]);
        // untouched key survives the merge
        assert_eq!(merged.departments, vec!["Produkcja".to_string()]);

        let reread = get_settings(&store).await.unwrap();
        assert_eq!(reread.localities.len(), 2);
    }

    #[tokio::test]
    async fn coordinators_round_trip_through_the_row() {
        let store = JsonStore::in_memory();
        let coord = Coordinator {
            uid: "coord-1".into(),
            name: "Anna Kowalska".into(),
            password: "sekret".into(),
            is_admin: true,
            departments: vec!["Produkcja".into()],
            push_subscription: Some("token-1".into()),
        };
        save_settings(
            &store,
            &Settings {
                coordinators: vec![coord],
                ..Settings::default()
            },
        )
        .await
        .unwrap();

        let s = get_settings(&store).await.unwrap();
        assert_eq!(s.coordinators.len(), 1);
        assert_eq!(s.coordinators[0].name, "Anna Kowalska");
        assert_eq!(s.coordinators[0].push_subscription.as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let store = JsonStore::in_memory();
        ensure_settings(&store).await.unwrap();
        ensure_settings(&store).await.unwrap();
        assert_eq!(store.get_rows(sheets::SETTINGS).await.unwrap().len(), 1);
    }
}
