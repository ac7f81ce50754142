// src/status.rs

//! Status reconciliation: sweep every resident sheet and dismiss the rows
//! whose relevant departure date has passed. Employees and non-employees go
//! by check-out date; BOK residents go by dismissal date only, a check-out
//! date alone never dismisses them.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::models::rows;
use crate::models::{ResidentKind, ResidentStatus, StatusCheckOutcome};
use crate::store::{SheetStore, StoreError};

/// Run one reconciliation pass as of `today`. Only the status cell of each
/// affected row is written, every other cell keeps its stored formatting.
pub async fn check_and_update_statuses(
    store: &dyn SheetStore,
    today: NaiveDate,
) -> Result<StatusCheckOutcome, StoreError> {
    let mut updated = 0usize;

    for kind in ResidentKind::ALL {
        let records = store.get_rows(kind.sheet()).await?;
        for rec in &records {
            let id = rec.get(rows::COL_ID).map(String::as_str).unwrap_or("");
            if id.is_empty() {
                debug!(sheet = kind.sheet(), "skipping row without id");
                continue;
            }

            let resident = rows::resident_from_row(rec);
            if resident.status == ResidentStatus::Dismissed {
                continue;
            }
            let Some(due) = kind.dismissal_date(&resident) else {
                continue;
            };
            if due < today {
                store
                    .set_cell(
                        kind.sheet(),
                        rows::COL_ID,
                        id,
                        rows::COL_STATUS,
                        ResidentStatus::Dismissed.as_str(),
                    )
                    .await?;
                updated += 1;
                info!(sheet = kind.sheet(), id, %due, "resident dismissed");
            }
        }
    }

    info!(updated, "status check finished");
    Ok(StatusCheckOutcome { updated })
}
