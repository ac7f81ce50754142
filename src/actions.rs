// src/actions.rs

//! Typed read paths over the sheet store. Route handlers and the engines go
//! through these helpers so the untyped rows never leak past the codec.

use crate::models::{Address, Resident, ResidentKind, Room};
use crate::models::rows;
use crate::store::{sheets, SheetStore, StoreError};

/// All residents of one kind, in sheet order.
pub async fn load_residents(
    store: &dyn SheetStore,
    kind: ResidentKind,
) -> Result<Vec<Resident>, StoreError> {
    let rows = store.get_rows(kind.sheet()).await?;
    Ok(rows.iter().map(rows::resident_from_row).collect())
}

/// One resident by id, or `RowNotFound`.
pub async fn find_resident(
    store: &dyn SheetStore,
    kind: ResidentKind,
    id: &str,
) -> Result<Resident, StoreError> {
    let all = store.get_rows(kind.sheet()).await?;
    all.iter()
        .find(|r| r.get(rows::COL_ID).map(String::as_str) == Some(id))
        .map(rows::resident_from_row)
        .ok_or_else(|| StoreError::not_found(kind.sheet(), rows::COL_ID, id))
}

/// Active residents across every kind, tagged with where they came from.
pub async fn load_active_residents(
    store: &dyn SheetStore,
) -> Result<Vec<(ResidentKind, Resident)>, StoreError> {
    let mut out = Vec::new();
    for kind in ResidentKind::ALL {
        let residents = load_residents(store, kind).await?;
        out.extend(
            residents
                .into_iter()
                .filter(Resident::is_active)
                .map(|r| (kind, r)),
        );
    }
    Ok(out)
}

/// All rooms, in sheet order.
pub async fn load_rooms(store: &dyn SheetStore) -> Result<Vec<Room>, StoreError> {
    let rows = store.get_rows(sheets::ROOMS).await?;
    Ok(rows.iter().map(rows::room_from_row).collect())
}

/// Addresses with their rooms joined in from the Rooms sheet.
pub async fn load_addresses(store: &dyn SheetStore) -> Result<Vec<Address>, StoreError> {
    let address_rows = store.get_rows(sheets::ADDRESSES).await?;
    let all_rooms = load_rooms(store).await?;

    let mut addresses: Vec<Address> = address_rows.iter().map(rows::address_from_row).collect();
    for addr in &mut addresses {
        addr.rooms = all_rooms
            .iter()
            .filter(|room| room.address_id == addr.id)
            .cloned()
            .collect();
    }
    Ok(addresses)
}

/// One address (rooms joined) by id, or `RowNotFound`.
pub async fn find_address(store: &dyn SheetStore, id: &str) -> Result<Address, StoreError> {
    let all = load_addresses(store).await?;
    all.into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| StoreError::not_found(sheets::ADDRESSES, rows::COL_ID, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rows::{address_to_row, resident_to_row, room_to_row};
    use crate::models::{ResidentStatus};
    use crate::store::JsonStore;

    fn resident(id: &str, status: ResidentStatus) -> Resident {
        Resident {
            id: id.to_string(),
            first_name: "Jan".into(),
            last_name: "Nowak".into(),
            status,
            ..Resident::default()
        }
    }

    #[tokio::test]
    async fn active_union_spans_all_sheets() {
        let store = JsonStore::in_memory();
        store
            .add_row(sheets::EMPLOYEES, resident_to_row(&resident("e1", ResidentStatus::Active)))
            .await
            .unwrap();
        store
            .add_row(
                sheets::EMPLOYEES,
                resident_to_row(&resident("e2", ResidentStatus::Dismissed)),
            )
            .await
            .unwrap();
        store
            .add_row(
                sheets::NON_EMPLOYEES,
                resident_to_row(&resident("n1", ResidentStatus::Active)),
            )
            .await
            .unwrap();
        store
            .add_row(
                sheets::BOK_RESIDENTS,
                resident_to_row(&resident("b1", ResidentStatus::Active)),
            )
            .await
            .unwrap();

        let active = load_active_residents(&store).await.unwrap();
        let ids: Vec<&str> = active.iter().map(|(_, r)| r.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "n1", "b1"]);
        assert_eq!(active[0].0, ResidentKind::Employee);
        assert_eq!(active[2].0, ResidentKind::Bok);
    }

    #[tokio::test]
    async fn addresses_join_their_rooms() {
        let store = JsonStore::in_memory();
        let addr = Address {
            id: "a1".into(),
            name: "Polna 5".into(),
            locality: "Poznań".into(),
            ..Address::default()
        };
        store
            .add_row(sheets::ADDRESSES, address_to_row(&addr))
            .await
            .unwrap();
        for (id, addr_id) in [("r1", "a1"), ("r2", "a1"), ("r3", "other")] {
            let room = Room {
                id: id.into(),
                address_id: addr_id.into(),
                name: "1".into(),
                capacity: 2,
                is_active: true,
                is_locked: false,
            };
            store.add_row(sheets::ROOMS, room_to_row(&room)).await.unwrap();
        }

        let found = find_address(&store, "a1").await.unwrap();
        assert_eq!(found.rooms.len(), 2);
        assert!(find_address(&store, "missing").await.unwrap_err().is_not_found());
    }
}
