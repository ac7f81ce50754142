// src/import.rs

//! Excel import pipeline for employees and non-employees.
//!
//! Input is a base64-encoded workbook. Every data row is validated on its
//! own; failures turn into Polish per-row messages in the report and never
//! abort the import. All valid rows are inserted with a single batched
//! `add_rows` call, and newly seen localities extend Settings exactly once.

use std::collections::HashMap;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use calamine::{Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::dates::{date_cell, now_stamp, parse_lenient};
use crate::models::rows::resident_to_row;
use crate::models::{
    ImportReport, ImportState, ImportStatusRecord, Resident, ResidentKind, Settings, SettingsPatch,
};
use crate::models::rows;
use crate::settings::{get_settings, update_settings};
use crate::store::{sheets, SheetStore, StoreError};

// Recognized Polish headers, as they appear in the office templates.
const H_FIRST_NAME: &str = "Imię";
const H_LAST_NAME: &str = "Nazwisko";
const H_FULL_NAME: &str = "Imię i nazwisko";
const H_COORDINATOR: &str = "Koordynator";
const H_NATIONALITY: &str = "Narodowość";
const H_ZAKLAD: &str = "Zakład";
const H_LOCALITY: &str = "Miejscowość";
const H_ADDRESS: &str = "Adres";
const H_ROOM: &str = "Pokój";
const H_CHECK_IN: &str = "Data zameldowania";
const H_COMMENTS: &str = "Uwagi";
const H_PAYMENT_TYPE: &str = "Rodzaj płatności NZ";
const H_AMOUNT: &str = "Kwota";

const RECOGNIZED_HEADERS: [&str; 13] = [
    H_FIRST_NAME,
    H_LAST_NAME,
    H_FULL_NAME,
    H_COORDINATOR,
    H_NATIONALITY,
    H_ZAKLAD,
    H_LOCALITY,
    H_ADDRESS,
    H_ROOM,
    H_CHECK_IN,
    H_COMMENTS,
    H_PAYMENT_TYPE,
    H_AMOUNT,
];

/// One data row, numbered 1-based as the operator sees it under the header.
struct ImportRow {
    number: usize,
    cells: HashMap<&'static str, String>,
}

impl ImportRow {
    fn cell(&self, header: &str) -> &str {
        self.cells.get(header).map(String::as_str).unwrap_or("")
    }
}

struct Validated {
    residents: Vec<Resident>,
    errors: Vec<String>,
    new_localities: Vec<String>,
}

fn canonical_header(cell: &str) -> Option<&'static str> {
    let needle = cell.trim().to_lowercase();
    RECOGNIZED_HEADERS
        .iter()
        .copied()
        .find(|h| h.to_lowercase() == needle)
}

/// Excel serial dates count days from 1899-12-30.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

fn cell_text(value: &Data) -> String {
    match value {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(v) => v.trim().to_string(),
        Data::Bool(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Float(v) => {
            if v.fract() == 0.0 {
                format!("{}", *v as i64)
            } else {
                v.to_string()
            }
        }
        Data::DateTime(v) => excel_serial_to_date(v.as_f64())
            .map(|d| date_cell(Some(d)))
            .unwrap_or_default(),
        Data::DateTimeIso(v) => v.clone(),
        Data::DurationIso(v) => v.clone(),
    }
}

/// Decode the first worksheet into numbered rows keyed by recognized header.
/// Fully empty rows keep their number but are dropped from the result.
fn read_workbook(bytes: &[u8]) -> Result<Vec<ImportRow>, String> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| format!("Nie można odczytać pliku: {e}"))?;
    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Nie można odczytać arkusza '{sheet_name}': {e}"))?;

    let mut data_rows = range.rows();
    let Some(header_row) = data_rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<Option<&'static str>> =
        header_row.iter().map(|c| canonical_header(&cell_text(c))).collect();

    let mut out = Vec::new();
    for (idx, row) in data_rows.enumerate() {
        let mut cells = HashMap::new();
        for (col, value) in row.iter().enumerate() {
            let Some(Some(header)) = headers.get(col) else {
                continue;
            };
            let text = cell_text(value);
            if !text.is_empty() {
                cells.insert(*header, text);
            }
        }
        if cells.is_empty() {
            continue;
        }
        out.push(ImportRow { number: idx + 1, cells });
    }
    Ok(out)
}

/// Combined name cells are surname-first: the first token is the last name,
/// the rest joins into the first name.
fn split_full_name(full: &str) -> (String, String) {
    let mut tokens = full.split_whitespace();
    let last = tokens.next().unwrap_or("").to_string();
    let first = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}

fn validate_rows(rows_in: &[ImportRow], kind: ResidentKind, settings: &Settings) -> Validated {
    let mut residents = Vec::new();
    let mut errors = Vec::new();
    let mut new_localities: Vec<String> = Vec::new();

    let known_locality = |name: &str, staged: &[String]| {
        let needle = name.trim().to_lowercase();
        settings
            .localities
            .iter()
            .any(|l| l.trim().to_lowercase() == needle)
            || staged.iter().any(|l| l.trim().to_lowercase() == needle)
    };

    for row in rows_in {
        let mut first_name = row.cell(H_FIRST_NAME).trim().to_string();
        let mut last_name = row.cell(H_LAST_NAME).trim().to_string();
        if first_name.is_empty() && last_name.is_empty() {
            let full = row.cell(H_FULL_NAME).trim();
            if !full.is_empty() {
                let (first, last) = split_full_name(full);
                first_name = first;
                last_name = last;
            }
        }

        let coordinator_cell = row.cell(H_COORDINATOR).trim().to_string();
        let check_in = parse_lenient(row.cell(H_CHECK_IN));

        let mut missing: Vec<&str> = Vec::new();
        if first_name.is_empty() {
            missing.push("imię");
        }
        if last_name.is_empty() {
            missing.push("nazwisko");
        }
        if coordinator_cell.is_empty() {
            missing.push("koordynator");
        }
        if check_in.is_none() {
            missing.push("data zameldowania");
        }
        if !missing.is_empty() {
            errors.push(format!(
                "Wiersz {}: Brak wymaganych danych w kolumnach: {}",
                row.number,
                missing.join(", ")
            ));
            continue;
        }

        let coordinator_needle = coordinator_cell.to_lowercase();
        let Some(coordinator) = settings
            .coordinators
            .iter()
            .find(|c| c.name.trim().to_lowercase() == coordinator_needle)
        else {
            errors.push(format!(
                "Wiersz {}: Nie znaleziono koordynatora '{}'",
                row.number, coordinator_needle
            ));
            continue;
        };

        let mut resident = Resident {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            coordinator_id: coordinator.uid.clone(),
            nationality: row.cell(H_NATIONALITY).trim().to_string(),
            address: row.cell(H_ADDRESS).trim().to_string(),
            room_number: row.cell(H_ROOM).trim().to_string(),
            zaklad: row.cell(H_ZAKLAD).trim().to_string(),
            check_in_date: check_in,
            comments: row.cell(H_COMMENTS).trim().to_string(),
            ..Resident::default()
        };
        if kind == ResidentKind::NonEmployee {
            resident.payment_type_nz = row.cell(H_PAYMENT_TYPE).trim().to_string();
            resident.amount = row.cell(H_AMOUNT).trim().to_string();
        }
        residents.push(resident);

        let locality = row.cell(H_LOCALITY).trim();
        if !locality.is_empty() && !known_locality(locality, &new_localities) {
            new_localities.push(locality.to_string());
        }
    }

    Validated {
        residents,
        errors,
        new_localities,
    }
}

async fn write_status(store: &dyn SheetStore, record: &ImportStatusRecord) -> Result<(), StoreError> {
    let row = rows::import_status_to_row(record);
    match store
        .update_row(sheets::IMPORT_STATUS, rows::COL_ID, &record.id, row.clone())
        .await
    {
        Err(e) if e.is_not_found() => store.add_row(sheets::IMPORT_STATUS, row).await,
        other => other,
    }
}

/// Run the whole pipeline for one uploaded file. Per-row problems land in
/// `errors`, only store failures propagate.
pub async fn run_import(
    store: &dyn SheetStore,
    kind: ResidentKind,
    file_base64: &str,
    file_name: &str,
    actor_name: &str,
) -> Result<ImportReport, StoreError> {
    let job_id = Uuid::new_v4().to_string();
    let mut status = ImportStatusRecord {
        id: job_id.clone(),
        file_name: file_name.to_string(),
        status: ImportState::Processing,
        total_rows: 0,
        processed_rows: 0,
        message: String::new(),
        actor_name: actor_name.to_string(),
        file_hash: String::new(),
        created_at: now_stamp(),
    };

    let bytes = match BASE64.decode(file_base64.trim()) {
        Ok(b) => b,
        Err(_) => {
            let message = "Nieprawidłowe dane pliku (base64)".to_string();
            status.status = ImportState::Failed;
            status.message = message.clone();
            write_status(store, &status).await?;
            return Ok(ImportReport {
                job_id,
                imported_count: 0,
                total_rows: 0,
                errors: vec![message],
            });
        }
    };
    status.file_hash = format!("{:x}", Sha256::digest(&bytes));
    write_status(store, &status).await?;

    let parsed = match read_workbook(&bytes) {
        Ok(rows) => rows,
        Err(message) => {
            status.status = ImportState::Failed;
            status.message = message.clone();
            write_status(store, &status).await?;
            return Ok(ImportReport {
                job_id,
                imported_count: 0,
                total_rows: 0,
                errors: vec![message],
            });
        }
    };

    let settings = get_settings(store).await?;
    let validated = validate_rows(&parsed, kind, &settings);
    for err in &validated.errors {
        debug!(job_id, "{err}");
    }

    if !validated.residents.is_empty() {
        let batch: Vec<_> = validated.residents.iter().map(resident_to_row).collect();
        store.add_rows(kind.sheet(), batch).await?;
    }
    if !validated.new_localities.is_empty() {
        let mut localities = settings.localities.clone();
        localities.extend(validated.new_localities.iter().cloned());
        update_settings(
            store,
            SettingsPatch {
                localities: Some(localities),
                ..SettingsPatch::default()
            },
        )
        .await?;
    }

    let imported_count = validated.residents.len();
    let total_rows = parsed.len();
    status.status = ImportState::Completed;
    status.total_rows = total_rows as u32;
    status.processed_rows = imported_count as u32;
    status.message = format!("Zaimportowano {imported_count} z {total_rows} wierszy");
    write_status(store, &status).await?;

    info!(
        job_id,
        sheet = kind.sheet(),
        imported_count,
        total_rows,
        rejected = validated.errors.len(),
        "import finished"
    );

    Ok(ImportReport {
        job_id,
        imported_count,
        total_rows,
        errors: validated.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinator;

    fn coordinator(uid: &str, name: &str) -> Coordinator {
        Coordinator {
            uid: uid.into(),
            name: name.into(),
            password: String::new(),
            is_admin: false,
            departments: Vec::new(),
            push_subscription: None,
        }
    }

    fn settings_with(coords: Vec<Coordinator>, localities: Vec<&str>) -> Settings {
        Settings {
            coordinators: coords,
            localities: localities.into_iter().map(str::to_string).collect(),
            ..Settings::default()
        }
    }

    fn row(number: usize, cells: &[(&'static str, &str)]) -> ImportRow {
        ImportRow {
            number,
            cells: cells.iter().map(|(h, v)| (*h, v.to_string())).collect(),
        }
    }

    #[test]
    fn headers_match_case_insensitively() {
        assert_eq!(canonical_header("  IMIĘ "), Some(H_FIRST_NAME));
        assert_eq!(canonical_header("data ZAMELDOWANIA"), Some(H_CHECK_IN));
        assert_eq!(canonical_header("Nr buta"), None);
    }

    #[test]
    fn serial_dates_convert_from_the_1900_epoch() {
        assert_eq!(
            excel_serial_to_date(45306.0),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn numeric_cells_render_without_trailing_zero() {
        assert_eq!(cell_text(&Data::Float(1200.0)), "1200");
        assert_eq!(cell_text(&Data::Float(1200.5)), "1200.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn combined_name_cell_is_surname_first() {
        assert_eq!(split_full_name("Kowalski Jan"), ("Jan".into(), "Kowalski".into()));
        assert_eq!(
            split_full_name("Nowak Anna Maria"),
            ("Anna Maria".into(), "Nowak".into())
        );
        assert_eq!(split_full_name("Kowalski"), ("".into(), "Kowalski".into()));
    }

    #[test]
    fn missing_required_columns_are_reported_together() {
        let settings = settings_with(vec![coordinator("c1", "Anna Kowalska")], vec![]);
        let rows_in = vec![row(1, &[(H_FIRST_NAME, "Jan")])];

        let v = validate_rows(&rows_in, ResidentKind::Employee, &settings);
        assert!(v.residents.is_empty());
        assert_eq!(
            v.errors,
            vec!["Wiersz 1: Brak wymaganych danych w kolumnach: nazwisko, koordynator, data zameldowania"]
        );
    }

    #[test]
    fn unknown_coordinator_is_reported_lowercased() {
        let settings = settings_with(vec![coordinator("c1", "Anna Kowalska")], vec![]);
        let rows_in = vec![row(
            3,
            &[
                (H_FIRST_NAME, "Jan"),
                (H_LAST_NAME, "Nowak"),
                (H_COORDINATOR, "Barbara Wiśniewska"),
                (H_CHECK_IN, "15.01.2024"),
            ],
        )];

        let v = validate_rows(&rows_in, ResidentKind::Employee, &settings);
        assert!(v.residents.is_empty());
        assert_eq!(
            v.errors,
            vec!["Wiersz 3: Nie znaleziono koordynatora 'barbara wiśniewska'"]
        );
    }

    #[test]
    fn valid_row_builds_an_active_resident() {
        let settings = settings_with(vec![coordinator("c1", "Anna Kowalska")], vec!["Poznań"]);
        let rows_in = vec![row(
            1,
            &[
                (H_FULL_NAME, "Nowak Jan"),
                (H_COORDINATOR, "anna kowalska"),
                (H_CHECK_IN, "2024-01-15"),
                (H_ADDRESS, "Polna 5"),
                (H_ROOM, "3"),
                (H_LOCALITY, "Luboń"),
            ],
        )];

        let v = validate_rows(&rows_in, ResidentKind::Employee, &settings);
        assert!(v.errors.is_empty());
        assert_eq!(v.residents.len(), 1);
        let r = &v.residents[0];
        assert_eq!(r.first_name, "Jan");
        assert_eq!(r.last_name, "Nowak");
        assert_eq!(r.coordinator_id, "c1");
        assert_eq!(r.check_in_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert!(r.is_active());
        assert_eq!(v.new_localities, vec!["Luboń"]);
    }

    #[test]
    fn localities_stage_once_without_known_duplicates() {
        let settings = settings_with(vec![coordinator("c1", "Anna Kowalska")], vec!["Poznań"]);
        let base = [
            (H_FIRST_NAME, "Jan"),
            (H_LAST_NAME, "Nowak"),
            (H_COORDINATOR, "Anna Kowalska"),
            (H_CHECK_IN, "15.01.2024"),
        ];
        let mut r1: Vec<(&'static str, &str)> = base.to_vec();
        r1.push((H_LOCALITY, "luboń"));
        let mut r2: Vec<(&'static str, &str)> = base.to_vec();
        r2.push((H_LOCALITY, "Luboń"));
        let mut r3: Vec<(&'static str, &str)> = base.to_vec();
        r3.push((H_LOCALITY, " poznań "));
        let rows_in = vec![row(1, &r1), row(2, &r2), row(3, &r3)];

        let v = validate_rows(&rows_in, ResidentKind::Employee, &settings);
        assert_eq!(v.residents.len(), 3);
        assert_eq!(v.new_localities, vec!["luboń"]);
    }

    #[test]
    fn payment_fields_fill_for_non_employees_only() {
        let settings = settings_with(vec![coordinator("c1", "Anna Kowalska")], vec![]);
        let cells = [
            (H_FIRST_NAME, "Jan"),
            (H_LAST_NAME, "Nowak"),
            (H_COORDINATOR, "Anna Kowalska"),
            (H_CHECK_IN, "15.01.2024"),
            (H_PAYMENT_TYPE, "przelew"),
            (H_AMOUNT, "1200"),
        ];

        let employees = validate_rows(&[row(1, &cells)], ResidentKind::Employee, &settings);
        assert_eq!(employees.residents[0].payment_type_nz, "");

        let non_employees = validate_rows(&[row(1, &cells)], ResidentKind::NonEmployee, &settings);
        assert_eq!(non_employees.residents[0].payment_type_nz, "przelew");
        assert_eq!(non_employees.residents[0].amount, "1200");
    }
}
