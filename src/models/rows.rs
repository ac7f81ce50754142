// src/models/rows.rs

//! Serialization boundary between the typed domain model and the flat
//! string-keyed rows of the sheet store.
//!
//! Every codec writes the full column set; absent values become empty
//! strings, never omitted columns, so the sheet schema stays stable. Dates
//! serialize to `yyyy-MM-dd` and deserialize through the lenient parser in
//! [`crate::dates`]. Untyped `Record` access stops at this module; the rest of
//! the crate works with the structs from [`crate::models`].

use crate::dates::{date_cell, parse_lenient};
use crate::models::{
    Address, AddressHistoryRecord, AuditEntry, EquipmentItem, FieldChange, ImportState,
    ImportStatusRecord, Inspection, NotificationRecord, Resident, ResidentStatus, Room,
};
use crate::store::Record;

/// Key column shared by every sheet.
pub const COL_ID: &str = "id";
pub const COL_STATUS: &str = "status";
pub const COL_EMPLOYEE_ID: &str = "employeeId";
pub const COL_ADDRESS_ID: &str = "addressId";

fn put(rec: &mut Record, col: &str, val: impl Into<String>) {
    rec.insert(col.to_string(), val.into());
}

fn cell<'a>(rec: &'a Record, col: &str) -> &'a str {
    rec.get(col).map(String::as_str).unwrap_or("")
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim() {
        "" => default,
        "1" => true,
        "0" => false,
        other => other.eq_ignore_ascii_case("true"),
    }
}

fn parse_u32(s: &str) -> u32 {
    s.trim().parse().unwrap_or(0)
}

fn bool_cell(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

// ───────────────────────────────────────
// Residents
// ───────────────────────────────────────

pub fn resident_to_row(r: &Resident) -> Record {
    let mut rec = Record::new();
    put(&mut rec, COL_ID, &r.id);
    // fullName is always recomputed on write; it is a derived column kept for
    // sheet readability, not an input field.
    put(&mut rec, "fullName", r.derived_full_name());
    put(&mut rec, "firstName", &r.first_name);
    put(&mut rec, "lastName", &r.last_name);
    put(&mut rec, "coordinatorId", &r.coordinator_id);
    put(&mut rec, "nationality", &r.nationality);
    put(&mut rec, "gender", &r.gender);
    put(&mut rec, "address", &r.address);
    put(&mut rec, "roomNumber", &r.room_number);
    put(&mut rec, "zaklad", &r.zaklad);
    put(&mut rec, "checkInDate", date_cell(r.check_in_date));
    put(&mut rec, "checkOutDate", date_cell(r.check_out_date));
    put(&mut rec, "dismissDate", date_cell(r.dismiss_date));
    put(&mut rec, COL_STATUS, r.status.as_str());
    put(&mut rec, "comments", &r.comments);
    put(&mut rec, "paymentTypeNZ", &r.payment_type_nz);
    put(&mut rec, "amount", &r.amount);
    put(&mut rec, "bokStatus", &r.bok_status);
    put(&mut rec, "bokRole", &r.bok_role);
    put(&mut rec, "bokReturnOption", &r.bok_return_option);
    rec
}

pub fn resident_from_row(rec: &Record) -> Resident {
    let first_name = cell(rec, "firstName").to_string();
    let last_name = cell(rec, "lastName").to_string();
    let mut r = Resident {
        id: cell(rec, COL_ID).to_string(),
        full_name: cell(rec, "fullName").to_string(),
        first_name,
        last_name,
        coordinator_id: cell(rec, "coordinatorId").to_string(),
        nationality: cell(rec, "nationality").to_string(),
        gender: cell(rec, "gender").to_string(),
        address: cell(rec, "address").to_string(),
        room_number: cell(rec, "roomNumber").to_string(),
        zaklad: cell(rec, "zaklad").to_string(),
        check_in_date: parse_lenient(cell(rec, "checkInDate")),
        check_out_date: parse_lenient(cell(rec, "checkOutDate")),
        dismiss_date: parse_lenient(cell(rec, "dismissDate")),
        status: ResidentStatus::from_cell(cell(rec, COL_STATUS)),
        comments: cell(rec, "comments").to_string(),
        payment_type_nz: cell(rec, "paymentTypeNZ").to_string(),
        amount: cell(rec, "amount").to_string(),
        bok_status: cell(rec, "bokStatus").to_string(),
        bok_role: cell(rec, "bokRole").to_string(),
        bok_return_option: cell(rec, "bokReturnOption").to_string(),
    };
    if r.full_name.is_empty() {
        r.full_name = r.derived_full_name();
    }
    r
}

// ───────────────────────────────────────
// Addresses & Rooms
// ───────────────────────────────────────

pub fn address_to_row(a: &Address) -> Record {
    let mut rec = Record::new();
    put(&mut rec, COL_ID, &a.id);
    put(&mut rec, "name", &a.name);
    put(&mut rec, "locality", &a.locality);
    put(&mut rec, "coordinatorIds", a.coordinator_ids.join(","));
    put(&mut rec, "isActive", bool_cell(a.is_active));
    rec
}

/// Rooms live in their own sheet; the caller joins them in afterwards.
pub fn address_from_row(rec: &Record) -> Address {
    Address {
        id: cell(rec, COL_ID).to_string(),
        name: cell(rec, "name").to_string(),
        locality: cell(rec, "locality").to_string(),
        coordinator_ids: cell(rec, "coordinatorIds")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        is_active: parse_bool(cell(rec, "isActive"), true),
        rooms: Vec::new(),
    }
}

pub fn room_to_row(r: &Room) -> Record {
    let mut rec = Record::new();
    put(&mut rec, COL_ID, &r.id);
    put(&mut rec, COL_ADDRESS_ID, &r.address_id);
    put(&mut rec, "name", &r.name);
    put(&mut rec, "capacity", r.capacity.to_string());
    put(&mut rec, "isActive", bool_cell(r.is_active));
    put(&mut rec, "isLocked", bool_cell(r.is_locked));
    rec
}

pub fn room_from_row(rec: &Record) -> Room {
    Room {
        id: cell(rec, COL_ID).to_string(),
        address_id: cell(rec, COL_ADDRESS_ID).to_string(),
        name: cell(rec, "name").to_string(),
        capacity: parse_u32(cell(rec, "capacity")),
        is_active: parse_bool(cell(rec, "isActive"), true),
        is_locked: parse_bool(cell(rec, "isLocked"), false),
    }
}

// ───────────────────────────────────────
// Side-channel records
// ───────────────────────────────────────

pub fn notification_to_row(n: &NotificationRecord) -> Record {
    let mut rec = Record::new();
    put(&mut rec, COL_ID, &n.id);
    put(&mut rec, "message", &n.message);
    put(
        &mut rec,
        "changes",
        serde_json::to_string(&n.changes).unwrap_or_else(|_| "[]".to_string()),
    );
    put(&mut rec, "recipientId", &n.recipient_id);
    put(&mut rec, "createdAt", &n.created_at);
    rec
}

pub fn notification_from_row(rec: &Record) -> NotificationRecord {
    NotificationRecord {
        id: cell(rec, COL_ID).to_string(),
        message: cell(rec, "message").to_string(),
        changes: serde_json::from_str(cell(rec, "changes")).unwrap_or_default(),
        recipient_id: cell(rec, "recipientId").to_string(),
        created_at: cell(rec, "createdAt").to_string(),
    }
}

pub fn audit_to_row(a: &AuditEntry) -> Record {
    let mut rec = Record::new();
    put(&mut rec, COL_ID, &a.id);
    put(&mut rec, "actorName", &a.actor_name);
    put(&mut rec, "action", &a.action);
    put(&mut rec, "entityId", &a.entity_id);
    put(&mut rec, "details", &a.details);
    put(&mut rec, "createdAt", &a.created_at);
    rec
}

pub fn audit_from_row(rec: &Record) -> AuditEntry {
    AuditEntry {
        id: cell(rec, COL_ID).to_string(),
        actor_name: cell(rec, "actorName").to_string(),
        action: cell(rec, "action").to_string(),
        entity_id: cell(rec, "entityId").to_string(),
        details: cell(rec, "details").to_string(),
        created_at: cell(rec, "createdAt").to_string(),
    }
}

pub fn import_status_to_row(s: &ImportStatusRecord) -> Record {
    let mut rec = Record::new();
    put(&mut rec, COL_ID, &s.id);
    put(&mut rec, "fileName", &s.file_name);
    put(&mut rec, COL_STATUS, s.status.as_str());
    put(&mut rec, "totalRows", s.total_rows.to_string());
    put(&mut rec, "processedRows", s.processed_rows.to_string());
    put(&mut rec, "message", &s.message);
    put(&mut rec, "actorName", &s.actor_name);
    put(&mut rec, "fileHash", &s.file_hash);
    put(&mut rec, "createdAt", &s.created_at);
    rec
}

pub fn import_status_from_row(rec: &Record) -> ImportStatusRecord {
    ImportStatusRecord {
        id: cell(rec, COL_ID).to_string(),
        file_name: cell(rec, "fileName").to_string(),
        status: ImportState::from_cell(cell(rec, COL_STATUS)),
        total_rows: parse_u32(cell(rec, "totalRows")),
        processed_rows: parse_u32(cell(rec, "processedRows")),
        message: cell(rec, "message").to_string(),
        actor_name: cell(rec, "actorName").to_string(),
        file_hash: cell(rec, "fileHash").to_string(),
        created_at: cell(rec, "createdAt").to_string(),
    }
}

pub fn history_to_row(h: &AddressHistoryRecord) -> Record {
    let mut rec = Record::new();
    put(&mut rec, COL_ID, &h.id);
    put(&mut rec, COL_EMPLOYEE_ID, &h.employee_id);
    put(&mut rec, "address", &h.address);
    put(&mut rec, "roomNumber", &h.room_number);
    put(&mut rec, "changedAt", &h.changed_at);
    rec
}

pub fn history_from_row(rec: &Record) -> AddressHistoryRecord {
    AddressHistoryRecord {
        id: cell(rec, COL_ID).to_string(),
        employee_id: cell(rec, COL_EMPLOYEE_ID).to_string(),
        address: cell(rec, "address").to_string(),
        room_number: cell(rec, "roomNumber").to_string(),
        changed_at: cell(rec, "changedAt").to_string(),
    }
}

// ───────────────────────────────────────
// Inspections & Equipment
// ───────────────────────────────────────

pub fn inspection_to_row(i: &Inspection) -> Record {
    let mut rec = Record::new();
    put(&mut rec, COL_ID, &i.id);
    put(&mut rec, "address", &i.address);
    put(&mut rec, "date", date_cell(i.date));
    put(&mut rec, COL_STATUS, &i.status);
    put(&mut rec, "coordinatorId", &i.coordinator_id);
    put(&mut rec, "notes", &i.notes);
    rec
}

pub fn inspection_from_row(rec: &Record) -> Inspection {
    Inspection {
        id: cell(rec, COL_ID).to_string(),
        address: cell(rec, "address").to_string(),
        date: parse_lenient(cell(rec, "date")),
        status: cell(rec, COL_STATUS).to_string(),
        coordinator_id: cell(rec, "coordinatorId").to_string(),
        notes: cell(rec, "notes").to_string(),
    }
}

pub fn equipment_to_row(e: &EquipmentItem) -> Record {
    let mut rec = Record::new();
    put(&mut rec, COL_ID, &e.id);
    put(&mut rec, "address", &e.address);
    put(&mut rec, "roomNumber", &e.room_number);
    put(&mut rec, "name", &e.name);
    put(&mut rec, "quantity", e.quantity.to_string());
    put(&mut rec, "condition", &e.condition);
    put(&mut rec, "notes", &e.notes);
    rec
}

pub fn equipment_from_row(rec: &Record) -> EquipmentItem {
    EquipmentItem {
        id: cell(rec, COL_ID).to_string(),
        address: cell(rec, "address").to_string(),
        room_number: cell(rec, "roomNumber").to_string(),
        name: cell(rec, "name").to_string(),
        quantity: parse_u32(cell(rec, "quantity")),
        condition: cell(rec, "condition").to_string(),
        notes: cell(rec, "notes").to_string(),
    }
}

// ───────────────────────────────────────
// Field-level diffs
// ───────────────────────────────────────

/// Column-level diff between two rows of the same sheet, for notification and
/// audit records. Keyed on the union of both column sets; the `id` column is
/// immutable and skipped.
pub fn diff_records(before: &Record, after: &Record) -> Vec<FieldChange> {
    let mut fields: Vec<&str> = before.keys().chain(after.keys()).map(String::as_str).collect();
    fields.sort_unstable();
    fields.dedup();

    let mut changes = Vec::new();
    for field in fields {
        if field == COL_ID {
            continue;
        }
        let from = cell(before, field);
        let to = cell(after, field);
        if from != to {
            changes.push(FieldChange {
                field: field.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }
    changes
}
