// src/reports.rs

//! Monthly residency report: for a given month, how many days each employee
//! and non-employee actually spent in housing. Day counts are inclusive on
//! both ends, so a stay from the 15th through the 31st is 17 days.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::actions::load_residents;
use crate::models::ResidentKind;
use crate::store::{SheetStore, StoreError};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReportEntry {
    pub id: String,
    pub full_name: String,
    pub kind: String,
    pub coordinator_id: String,
    pub address: String,
    pub room_number: String,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub days: u32,
    /// Billing fields, filled for non-employees only.
    pub payment_type_nz: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub entries: Vec<MonthlyReportEntry>,
    pub total_days: u64,
}

/// First and last day of the month, or `None` for an invalid year/month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Days of `[check_in, check_out]` falling inside `[first, last]`, both
/// ranges inclusive. A missing check-out means the stay is still open.
fn days_in_month(
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    first: NaiveDate,
    last: NaiveDate,
) -> u32 {
    let Some(start) = check_in else {
        return 0;
    };
    let from = start.max(first);
    let to = check_out.map_or(last, |d| d.min(last));
    if from > to {
        return 0;
    }
    ((to - from).num_days() + 1) as u32
}

/// Build the report over employees and non-employees. BOK residents are not
/// billed by the day and stay out of it.
pub async fn monthly_report(
    store: &dyn SheetStore,
    year: i32,
    month: u32,
    coordinator_id: Option<&str>,
) -> Result<Option<MonthlyReport>, StoreError> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Ok(None);
    };

    let mut entries = Vec::new();
    for kind in [ResidentKind::Employee, ResidentKind::NonEmployee] {
        for resident in load_residents(store, kind).await? {
            if let Some(filter) = coordinator_id {
                if resident.coordinator_id != filter {
                    continue;
                }
            }
            let days = days_in_month(resident.check_in_date, resident.check_out_date, first, last);
            if days == 0 {
                continue;
            }
            entries.push(MonthlyReportEntry {
                id: resident.id.clone(),
                full_name: resident.derived_full_name(),
                kind: kind.scope().to_string(),
                coordinator_id: resident.coordinator_id.clone(),
                address: resident.address.clone(),
                room_number: resident.room_number.clone(),
                check_in_date: resident.check_in_date,
                check_out_date: resident.check_out_date,
                days,
                payment_type_nz: resident.payment_type_nz.clone(),
                amount: resident.amount.clone(),
            });
        }
    }

    entries.sort_by_key(|e| e.full_name.to_lowercase());
    let total_days = entries.iter().map(|e| u64::from(e.days)).sum();
    Ok(Some(MonthlyReport {
        year,
        month,
        entries,
        total_days,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rows::resident_to_row;
    use crate::models::Resident;
    use crate::store::{sheets, JsonStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed(store: &JsonStore, sheet: &str, id: &str, ci: Option<NaiveDate>, co: Option<NaiveDate>) {
        let r = Resident {
            id: id.into(),
            first_name: "Jan".into(),
            last_name: "Nowak".into(),
            check_in_date: ci,
            check_out_date: co,
            ..Resident::default()
        };
        store.add_row(sheet, resident_to_row(&r)).await.unwrap();
    }

    #[test]
    fn bounds_cover_leap_february_and_december() {
        assert_eq!(
            month_bounds(2024, 2),
            Some((date(2024, 2, 1), date(2024, 2, 29)))
        );
        assert_eq!(
            month_bounds(2023, 12),
            Some((date(2023, 12, 1), date(2023, 12, 31)))
        );
        assert_eq!(month_bounds(2024, 13), None);
    }

    #[tokio::test]
    async fn partial_overlap_counts_inclusive_days() {
        let store = JsonStore::in_memory();
        seed(
            &store,
            sheets::EMPLOYEES,
            "e1",
            Some(date(2024, 1, 15)),
            Some(date(2024, 2, 10)),
        )
        .await;

        let report = monthly_report(&store, 2024, 1, None).await.unwrap().unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].days, 17);
        assert_eq!(report.total_days, 17);
    }

    #[tokio::test]
    async fn open_ended_stay_runs_to_month_end() {
        let store = JsonStore::in_memory();
        seed(&store, sheets::EMPLOYEES, "e1", Some(date(2023, 11, 2)), None).await;

        let report = monthly_report(&store, 2024, 1, None).await.unwrap().unwrap();
        assert_eq!(report.entries[0].days, 31);
    }

    #[tokio::test]
    async fn stays_outside_the_month_are_omitted() {
        let store = JsonStore::in_memory();
        seed(
            &store,
            sheets::EMPLOYEES,
            "before",
            Some(date(2023, 10, 1)),
            Some(date(2023, 12, 31)),
        )
        .await;
        seed(&store, sheets::EMPLOYEES, "after", Some(date(2024, 2, 1)), None).await;
        seed(&store, sheets::EMPLOYEES, "no-dates", None, None).await;

        let report = monthly_report(&store, 2024, 1, None).await.unwrap().unwrap();
        assert!(report.entries.is_empty());
        assert_eq!(report.total_days, 0);
    }

    #[tokio::test]
    async fn non_employees_are_included_bok_is_not() {
        let store = JsonStore::in_memory();
        seed(&store, sheets::NON_EMPLOYEES, "n1", Some(date(2024, 1, 1)), None).await;
        seed(&store, sheets::BOK_RESIDENTS, "b1", Some(date(2024, 1, 1)), None).await;

        let report = monthly_report(&store, 2024, 1, None).await.unwrap().unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].id, "n1");
        assert_eq!(report.entries[0].kind, "non-employees");
    }
}
