// src/occupancy.rs

//! Occupancy engine: joins active residents onto addresses and rooms by
//! name, counts heads against capacity, and rolls the numbers up per
//! address and per locality.

use serde::Serialize;

use crate::actions::{load_active_residents, load_addresses};
use crate::models::{Resident, ResidentKind};
use crate::store::{SheetStore, StoreError};

/// Addresses carrying this marker are the residents' own homes and never
/// appear in occupancy listings or summaries.
pub const OWN_HOME: &str = "własne mieszkanie";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantRef {
    pub id: String,
    pub full_name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOccupancy {
    pub room_id: String,
    pub name: String,
    pub capacity: u32,
    pub occupied: u32,
    pub available: u32,
    /// Effective flag: the room counts toward totals only when it is active,
    /// unlocked and its address is active.
    pub is_active: bool,
    pub is_locked: bool,
    pub residents: Vec<OccupantRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressOccupancy {
    pub address_id: String,
    pub name: String,
    pub locality: String,
    pub capacity: u32,
    pub occupied: u32,
    pub available: u32,
    pub rooms: Vec<RoomOccupancy>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalitySummary {
    pub locality: String,
    pub capacity: u32,
    pub occupied: u32,
    pub available: u32,
}

fn norm(s: &str) -> String {
    s.trim().to_lowercase()
}

fn occupant(kind: ResidentKind, r: &Resident) -> OccupantRef {
    OccupantRef {
        id: r.id.clone(),
        full_name: r.derived_full_name(),
        kind: kind.scope().to_string(),
    }
}

/// Compute occupancy for every listed address. With `coordinator_id` set,
/// only addresses assigned to that coordinator are listed.
pub async fn compute_occupancy(
    store: &dyn SheetStore,
    coordinator_id: Option<&str>,
) -> Result<Vec<AddressOccupancy>, StoreError> {
    let addresses = load_addresses(store).await?;
    let residents = load_active_residents(store).await?;

    let mut out: Vec<AddressOccupancy> = addresses
        .into_iter()
        .filter(|addr| !norm(&addr.name).contains(OWN_HOME))
        .filter(|addr| match coordinator_id {
            Some(uid) => addr.coordinator_ids.iter().any(|c| c == uid),
            None => true,
        })
        .map(|addr| {
            let mut rooms: Vec<RoomOccupancy> = addr
                .rooms
                .iter()
                .map(|room| RoomOccupancy {
                    room_id: room.id.clone(),
                    name: room.name.clone(),
                    capacity: room.capacity,
                    occupied: 0,
                    available: room.capacity,
                    is_active: room.is_active && !room.is_locked && addr.is_active,
                    is_locked: room.is_locked,
                    residents: Vec::new(),
                })
                .collect();
            rooms.sort_by(|a, b| norm(&a.name).cmp(&norm(&b.name)));
            AddressOccupancy {
                address_id: addr.id,
                name: addr.name,
                locality: addr.locality,
                capacity: 0,
                occupied: 0,
                available: 0,
                rooms,
            }
        })
        .collect();

    for (kind, resident) in &residents {
        let addr_key = norm(&resident.address);
        if addr_key.is_empty() || addr_key.contains(OWN_HOME) {
            continue;
        }
        let room_key = norm(&resident.room_number);
        let Some(address) = out.iter_mut().find(|a| norm(&a.name) == addr_key) else {
            continue;
        };
        let Some(room) = address.rooms.iter_mut().find(|r| norm(&r.name) == room_key) else {
            continue;
        };
        room.occupied += 1;
        room.residents.push(occupant(*kind, resident));
    }

    for address in &mut out {
        for room in &mut address.rooms {
            room.available = room.capacity.saturating_sub(room.occupied);
        }
        // totals follow the locality rule: active rooms only
        for room in address.rooms.iter().filter(|r| r.is_active) {
            address.capacity += room.capacity;
            address.occupied += room.occupied;
            address.available += room.available;
        }
    }

    out.sort_by(|a, b| (norm(&a.locality), norm(&a.name)).cmp(&(norm(&b.locality), norm(&b.name))));
    Ok(out)
}

/// Roll address occupancies up per locality. `compute_occupancy` already
/// restricted the address totals to active rooms.
pub fn locality_summary(occupancies: &[AddressOccupancy]) -> Vec<LocalitySummary> {
    let mut out: Vec<LocalitySummary> = Vec::new();
    for addr in occupancies {
        let key = norm(&addr.locality);
        match out.iter_mut().find(|s| norm(&s.locality) == key) {
            Some(summary) => {
                summary.capacity += addr.capacity;
                summary.occupied += addr.occupied;
                summary.available += addr.available;
            }
            None => out.push(LocalitySummary {
                locality: addr.locality.trim().to_string(),
                capacity: addr.capacity,
                occupied: addr.occupied,
                available: addr.available,
            }),
        }
    }
    out.sort_by(|a, b| norm(&a.locality).cmp(&norm(&b.locality)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rows::{address_to_row, resident_to_row, room_to_row};
    use crate::models::{Address, ResidentStatus, Room};
    use crate::store::{sheets, JsonStore};

    async fn seed_address(store: &JsonStore, id: &str, name: &str, locality: &str, coords: &[&str]) {
        let addr = Address {
            id: id.into(),
            name: name.into(),
            locality: locality.into(),
            coordinator_ids: coords.iter().map(|s| s.to_string()).collect(),
            ..Address::default()
        };
        store.add_row(sheets::ADDRESSES, address_to_row(&addr)).await.unwrap();
    }

    async fn seed_room(store: &JsonStore, id: &str, addr: &str, name: &str, cap: u32, active: bool) {
        let room = Room {
            id: id.into(),
            address_id: addr.into(),
            name: name.into(),
            capacity: cap,
            is_active: active,
            is_locked: false,
        };
        store.add_row(sheets::ROOMS, room_to_row(&room)).await.unwrap();
    }

    async fn seed_employee(store: &JsonStore, id: &str, address: &str, room: &str) {
        let r = Resident {
            id: id.into(),
            first_name: "Jan".into(),
            last_name: "Nowak".into(),
            address: address.into(),
            room_number: room.into(),
            status: ResidentStatus::Active,
            ..Resident::default()
        };
        store.add_row(sheets::EMPLOYEES, resident_to_row(&r)).await.unwrap();
    }

    #[tokio::test]
    async fn available_is_capacity_minus_occupied() {
        let store = JsonStore::in_memory();
        seed_address(&store, "a1", "Polna 5", "Poznań", &[]).await;
        seed_room(&store, "r1", "a1", "1", 5, true).await;
        for id in ["e1", "e2", "e3"] {
            seed_employee(&store, id, "Polna 5", "1").await;
        }

        let occ = compute_occupancy(&store, None).await.unwrap();
        assert_eq!(occ[0].rooms[0].occupied, 3);
        assert_eq!(occ[0].rooms[0].available, 2);
        assert_eq!(occ[0].available, 2);
    }

    #[tokio::test]
    async fn overfull_room_reports_zero_available() {
        let store = JsonStore::in_memory();
        seed_address(&store, "a1", "Polna 5", "Poznań", &[]).await;
        seed_room(&store, "r1", "a1", "1", 2, true).await;
        for id in ["e1", "e2", "e3", "e4", "e5", "e6"] {
            seed_employee(&store, id, "Polna 5", "1").await;
        }

        let occ = compute_occupancy(&store, None).await.unwrap();
        assert_eq!(occ[0].rooms[0].occupied, 6);
        assert_eq!(occ[0].rooms[0].available, 0);
    }

    #[tokio::test]
    async fn own_home_addresses_are_not_listed() {
        let store = JsonStore::in_memory();
        seed_address(&store, "a1", "Polna 5", "Poznań", &[]).await;
        seed_address(&store, "a2", "Własne mieszkanie", "Poznań", &[]).await;
        seed_room(&store, "r1", "a1", "1", 2, true).await;
        seed_room(&store, "r2", "a2", "1", 9, true).await;
        seed_employee(&store, "e1", " własne MIESZKANIE ", "1").await;

        let occ = compute_occupancy(&store, None).await.unwrap();
        assert_eq!(occ.len(), 1);
        assert_eq!(occ[0].name, "Polna 5");
        assert_eq!(occ[0].occupied, 0);
        let summary = locality_summary(&occ);
        assert_eq!(summary[0].capacity, 2);
    }

    #[tokio::test]
    async fn matching_ignores_case_and_whitespace() {
        let store = JsonStore::in_memory();
        seed_address(&store, "a1", "Polna 5", "Poznań", &[]).await;
        seed_room(&store, "r1", "a1", "1A", 2, true).await;
        seed_employee(&store, "e1", "  polna 5 ", " 1a ").await;

        let occ = compute_occupancy(&store, None).await.unwrap();
        assert_eq!(occ[0].rooms[0].occupied, 1);
        assert_eq!(occ[0].rooms[0].residents[0].full_name, "Nowak Jan");
    }

    #[tokio::test]
    async fn coordinator_filter_narrows_the_address_list() {
        let store = JsonStore::in_memory();
        seed_address(&store, "a1", "Polna 5", "Poznań", &["c1"]).await;
        seed_address(&store, "a2", "Leśna 2", "Poznań", &["c2"]).await;
        seed_room(&store, "r1", "a1", "1", 4, true).await;
        seed_room(&store, "r2", "a2", "1", 4, true).await;

        let occ = compute_occupancy(&store, Some("c1")).await.unwrap();
        assert_eq!(occ.len(), 1);
        assert_eq!(occ[0].name, "Polna 5");
    }

    #[tokio::test]
    async fn summaries_skip_inactive_rooms() {
        let store = JsonStore::in_memory();
        seed_address(&store, "a1", "Polna 5", "Poznań", &[]).await;
        seed_address(&store, "a2", "Leśna 2", "Poznań", &[]).await;
        seed_address(&store, "a3", "Krótka 1", "Luboń", &[]).await;
        seed_room(&store, "r1", "a1", "1", 4, true).await;
        seed_room(&store, "r2", "a1", "2", 6, false).await;
        seed_room(&store, "r3", "a2", "1", 3, true).await;
        seed_room(&store, "r4", "a3", "1", 2, true).await;
        seed_employee(&store, "e1", "Polna 5", "1").await;

        let occ = compute_occupancy(&store, None).await.unwrap();
        let summary = locality_summary(&occ);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].locality, "Luboń");
        assert_eq!(summary[1].locality, "Poznań");
        // inactive room r2 contributes nothing
        assert_eq!(summary[1].capacity, 7);
        assert_eq!(summary[1].occupied, 1);
        assert_eq!(summary[1].available, 6);
    }

    #[tokio::test]
    async fn locked_rooms_keep_their_listing_but_not_their_beds() {
        let store = JsonStore::in_memory();
        seed_address(&store, "a1", "Polna 5", "Poznań", &[]).await;
        let locked = Room {
            id: "r1".into(),
            address_id: "a1".into(),
            name: "1".into(),
            capacity: 3,
            is_active: true,
            is_locked: true,
        };
        store.add_row(sheets::ROOMS, room_to_row(&locked)).await.unwrap();

        let occ = compute_occupancy(&store, None).await.unwrap();
        assert_eq!(occ[0].rooms.len(), 1);
        assert!(!occ[0].rooms[0].is_active);
        assert!(occ[0].rooms[0].is_locked);
        assert_eq!(occ[0].capacity, 0);
    }

    #[tokio::test]
    async fn addresses_sort_by_locality_then_name() {
        let store = JsonStore::in_memory();
        seed_address(&store, "a1", "Zielona 9", "Poznań", &[]).await;
        seed_address(&store, "a2", "Akacjowa 1", "Poznań", &[]).await;
        seed_address(&store, "a3", "Polna 5", "Luboń", &[]).await;

        let occ = compute_occupancy(&store, None).await.unwrap();
        let names: Vec<&str> = occ.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Polna 5", "Akacjowa 1", "Zielona 9"]);
    }
}
