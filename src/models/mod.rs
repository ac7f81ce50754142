// src/models/mod.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod rows;

// ───────────────────────────────────────
// Residents (Employee / NonEmployee / BOK)
// ───────────────────────────────────────

/// Resident lifecycle status. Anything other than `dismissed` in a legacy row
/// is treated as `active`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidentStatus {
    #[default]
    Active,
    Dismissed,
}

impl ResidentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResidentStatus::Active => "active",
            ResidentStatus::Dismissed => "dismissed",
        }
    }

    pub fn from_cell(s: &str) -> Self {
        if s.trim() == "dismissed" {
            ResidentStatus::Dismissed
        } else {
            ResidentStatus::Active
        }
    }
}

/// The three resident collections share one shape; the kind tag selects the
/// sheet and the dismissal policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidentKind {
    Employee,
    NonEmployee,
    Bok,
}

impl ResidentKind {
    pub const ALL: [ResidentKind; 3] = [
        ResidentKind::Employee,
        ResidentKind::NonEmployee,
        ResidentKind::Bok,
    ];

    pub fn sheet(self) -> &'static str {
        match self {
            ResidentKind::Employee => crate::store::sheets::EMPLOYEES,
            ResidentKind::NonEmployee => crate::store::sheets::NON_EMPLOYEES,
            ResidentKind::Bok => crate::store::sheets::BOK_RESIDENTS,
        }
    }

    /// Audit/action scope prefix, e.g. `employees.update`.
    pub fn scope(self) -> &'static str {
        match self {
            ResidentKind::Employee => "employees",
            ResidentKind::NonEmployee => "non-employees",
            ResidentKind::Bok => "bok-residents",
        }
    }

    /// The date that drives automatic dismissal for this kind.
    ///
    /// Employees and non-employees dismiss on an expired `checkOutDate`. BOK
    /// residents dismiss on `dismissDate` only; an expired `checkOutDate`
    /// alone never dismisses a BOK resident. The asymmetry is intentional,
    /// do not unify the two rules.
    pub fn dismissal_date(self, r: &Resident) -> Option<NaiveDate> {
        match self {
            ResidentKind::Employee | ResidentKind::NonEmployee => r.check_out_date,
            ResidentKind::Bok => r.dismiss_date,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: String,
    /// Derived `"{lastName} {firstName}"`; recomputed whenever a name changes.
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub coordinator_id: String,
    pub nationality: String,
    pub gender: String,
    /// Denormalized Address.name, not a foreign key.
    pub address: String,
    pub room_number: String,
    pub zaklad: String,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub dismiss_date: Option<NaiveDate>,
    pub status: ResidentStatus,
    pub comments: String,
    // NonEmployee billing fields
    #[serde(rename = "paymentTypeNZ")]
    pub payment_type_nz: String,
    pub amount: String,
    // BOK-specific fields
    pub bok_status: String,
    pub bok_role: String,
    pub bok_return_option: String,
}

impl Resident {
    pub fn derived_full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
            .trim()
            .to_string()
    }

    pub fn is_active(&self) -> bool {
        self.status == ResidentStatus::Active
    }
}

// ───────────────────────────────────────
// Coordinators & Settings (singleton row)
// ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinator {
    pub uid: String,
    pub name: String,
    /// Stored in plain text for compatibility with the historical sheet;
    /// flagged in DESIGN.md. Blanked before a coordinator leaves the API,
    /// which also drops the key from the response.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Department scope for visibility; empty for admins.
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub push_subscription: Option<String>,
}

impl Coordinator {
    /// Copy with the password blanked, for API responses.
    pub fn sanitized(&self) -> Coordinator {
        Coordinator {
            password: String::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub coordinators: Vec<Coordinator>,
    #[serde(default)]
    pub localities: Vec<String>,
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub nationalities: Vec<String>,
    #[serde(default)]
    pub genders: Vec<String>,
    /// Legacy flat list of address names; the Addresses sheet is authoritative.
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default, rename = "paymentTypesNZ")]
    pub payment_types_nz: Vec<String>,
    #[serde(default)]
    pub bok_statuses: Vec<String>,
    #[serde(default)]
    pub bok_roles: Vec<String>,
    #[serde(default)]
    pub bok_return_options: Vec<String>,
}

/// Shallow-merge patch: only the provided top-level keys are replaced.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub coordinators: Option<Vec<Coordinator>>,
    pub localities: Option<Vec<String>>,
    pub departments: Option<Vec<String>>,
    pub nationalities: Option<Vec<String>>,
    pub genders: Option<Vec<String>>,
    pub addresses: Option<Vec<String>>,
    #[serde(rename = "paymentTypesNZ")]
    pub payment_types_nz: Option<Vec<String>>,
    pub bok_statuses: Option<Vec<String>>,
    pub bok_roles: Option<Vec<String>>,
    pub bok_return_options: Option<Vec<String>>,
}

impl Settings {
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.coordinators {
            self.coordinators = v;
        }
        if let Some(v) = patch.localities {
            self.localities = v;
        }
        if let Some(v) = patch.departments {
            self.departments = v;
        }
        if let Some(v) = patch.nationalities {
            self.nationalities = v;
        }
        if let Some(v) = patch.genders {
            self.genders = v;
        }
        if let Some(v) = patch.addresses {
            self.addresses = v;
        }
        if let Some(v) = patch.payment_types_nz {
            self.payment_types_nz = v;
        }
        if let Some(v) = patch.bok_statuses {
            self.bok_statuses = v;
        }
        if let Some(v) = patch.bok_roles {
            self.bok_roles = v;
        }
        if let Some(v) = patch.bok_return_options {
            self.bok_return_options = v;
        }
    }

    pub fn coordinator(&self, uid: &str) -> Option<&Coordinator> {
        self.coordinators.iter().find(|c| c.uid == uid)
    }
}

// ───────────────────────────────────────
// Addresses & Rooms
// ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub address_id: String,
    pub name: String,
    pub capacity: u32,
    pub is_active: bool,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    /// Unique; referenced by Resident.address as a plain string.
    pub name: String,
    pub locality: String,
    pub coordinator_ids: Vec<String>,
    pub is_active: bool,
    pub rooms: Vec<Room>,
}

impl Default for Address {
    fn default() -> Self {
        Address {
            id: String::new(),
            name: String::new(),
            locality: String::new(),
            coordinator_ids: Vec::new(),
            is_active: true,
            rooms: Vec::new(),
        }
    }
}

// ───────────────────────────────────────
// Side-channel records
// ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub message: String,
    pub changes: Vec<FieldChange>,
    pub recipient_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub actor_name: String,
    /// Dotted action code, e.g. `employees.update`.
    pub action: String,
    pub entity_id: String,
    pub details: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportState {
    Processing,
    Completed,
    Failed,
}

impl ImportState {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportState::Processing => "processing",
            ImportState::Completed => "completed",
            ImportState::Failed => "failed",
        }
    }

    pub fn from_cell(s: &str) -> Self {
        match s.trim() {
            "completed" => ImportState::Completed,
            "failed" => ImportState::Failed,
            _ => ImportState::Processing,
        }
    }
}

/// Tracks one import invocation end-to-end; polled by the client while the
/// request is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatusRecord {
    pub id: String,
    pub file_name: String,
    pub status: ImportState,
    pub total_rows: u32,
    pub processed_rows: u32,
    pub message: String,
    pub actor_name: String,
    /// SHA-256 hex of the decoded file.
    pub file_hash: String,
    pub created_at: String,
}

/// Room assignment history for employees; appended on creation and on every
/// address/room change, cascade-deleted with the employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressHistoryRecord {
    pub id: String,
    pub employee_id: String,
    pub address: String,
    pub room_number: String,
    pub changed_at: String,
}

// ───────────────────────────────────────
// Inspections & Equipment
// ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: String,
    pub address: String,
    pub date: Option<NaiveDate>,
    pub status: String,
    pub coordinator_id: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    pub id: String,
    pub address: String,
    pub room_number: String,
    pub name: String,
    pub quantity: u32,
    pub condition: String,
    pub notes: String,
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusCheckOutcome {
    pub updated: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub job_id: String,
    pub imported_count: usize,
    pub total_rows: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: bool,
}
