//! Daily check-in / check-out per employee.
//!
//! Both operations are two-phase: a cheap pre-check classifies the common
//! rejection, then the write itself is guarded by the store (unique day key
//! on insert, `checkout_at IS NULL` on update). The pre-check is not a
//! transactional guarantee; concurrent writers are arbitrated by the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use tracing::{error, info, warn};

use crate::error::{HrError, Result};
use crate::model::attendance::{Attendance, CheckOut, NewCheckIn};
use crate::store::{ATTENDANCE_CHECKOUT_ORDER, ATTENDANCE_DAY_KEY, AttendanceStore, StoreError, bounded};

#[derive(Clone)]
pub struct AttendanceLedger {
    store: Arc<dyn AttendanceStore>,
    timeout: Duration,
}

impl AttendanceLedger {
    pub fn new(store: Arc<dyn AttendanceStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn record_check_in(
        &self,
        employee_id: i64,
        as_of: DateTime<Tz>,
        actor: Option<i64>,
    ) -> Result<Attendance> {
        let att_date = business_day(&as_of)?;

        let new = NewCheckIn {
            employee_id,
            att_date,
            checkin_at: as_of.with_timezone(&Utc),
            actor,
        };

        match bounded(self.timeout, self.store.insert_check_in(new)).await {
            Ok(record) => {
                info!(employee_id, %att_date, id = record.id, "Checked in");
                Ok(record)
            }
            Err(e) if e.violates(ATTENDANCE_DAY_KEY) => {
                info!(employee_id, %att_date, "Duplicate check-in rejected");
                Err(HrError::DuplicateCheckIn)
            }
            Err(e) => Err(store_failure(e, employee_id, att_date, "Check-in failed")),
        }
    }

    pub async fn record_check_out(
        &self,
        employee_id: i64,
        as_of: DateTime<Tz>,
        actor: Option<i64>,
    ) -> Result<Attendance> {
        let att_date = business_day(&as_of)?;
        let checkout_at = as_of.with_timezone(&Utc);

        let existing = bounded(self.timeout, self.store.find(employee_id, att_date))
            .await
            .map_err(|e| store_failure(e, employee_id, att_date, "Attendance lookup failed"))?;

        let existing = existing.ok_or_else(|| {
            info!(employee_id, %att_date, "Check-out without check-in rejected");
            HrError::NoCheckInFound
        })?;

        if existing.checkout_at.is_some() {
            info!(employee_id, %att_date, "Duplicate check-out rejected");
            return Err(HrError::DuplicateCheckOut);
        }

        if checkout_at < existing.checkin_at {
            warn!(employee_id, %att_date, "Check-out earlier than check-in");
            return Err(HrError::CheckOutBeforeCheckIn);
        }

        let update = CheckOut {
            employee_id,
            att_date,
            checkout_at,
            actor,
        };

        match bounded(self.timeout, self.store.record_check_out(update)).await {
            Ok(Some(record)) => {
                info!(employee_id, %att_date, id = record.id, "Checked out");
                Ok(record)
            }
            // Lost a race against another check-out for the same day. Reported
            // like a missing check-in, matching what the guarded update can see.
            Ok(None) => {
                warn!(employee_id, %att_date, "Check-out update matched no row");
                Err(HrError::NoCheckInFound)
            }
            Err(e) if e.violates(ATTENDANCE_CHECKOUT_ORDER) => Err(HrError::CheckOutBeforeCheckIn),
            Err(e) => Err(store_failure(e, employee_id, att_date, "Check-out failed")),
        }
    }
}

/// Calendar date of `as_of` in its own (business) timezone; weekends are refused.
pub fn business_day(as_of: &DateTime<Tz>) -> Result<NaiveDate> {
    if matches!(as_of.weekday(), Weekday::Sat | Weekday::Sun) {
        info!(at = %as_of, "Attendance on weekend rejected");
        return Err(HrError::WeekendNotAllowed);
    }
    Ok(as_of.date_naive())
}

fn store_failure(err: StoreError, employee_id: i64, att_date: NaiveDate, what: &str) -> HrError {
    error!(error = %err, employee_id, %att_date, "{what}");
    err.into()
}
