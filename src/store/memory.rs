//! In-process stores that enforce the same constraints as the schema in
//! `migrations/`, for exercising the domain components without a database.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::model::attendance::{Attendance, CheckOut, NewCheckIn};
use crate::model::payroll_period::{NewPayrollPeriod, PayrollPeriod, PayrollPeriodStatus};
use crate::store::{
    ATTENDANCE_CHECKOUT_ORDER, ATTENDANCE_DAY_KEY, AttendanceStore, PERIOD_DATE_ORDER,
    PERIOD_NO_OVERLAP, PayrollPeriodStore, StoreError, StoreResult,
};

#[derive(Default)]
pub struct MemoryAttendanceStore {
    rows: Mutex<BTreeMap<(i64, NaiveDate), Attendance>>,
    next_id: AtomicI64,
}

impl MemoryAttendanceStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn insert_check_in(&self, new: NewCheckIn) -> StoreResult<Attendance> {
        let mut rows = self.rows.lock().unwrap();
        let key = (new.employee_id, new.att_date);
        if rows.contains_key(&key) {
            return Err(StoreError::UniqueViolation {
                constraint: ATTENDANCE_DAY_KEY.to_string(),
            });
        }

        let now = Utc::now();
        let row = Attendance {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            employee_id: new.employee_id,
            att_date: new.att_date,
            checkin_at: new.checkin_at,
            checkout_at: None,
            created_at: now,
            updated_at: now,
            created_by: new.actor,
            updated_by: new.actor,
        };
        rows.insert(key, row.clone());
        Ok(row)
    }

    async fn find(&self, employee_id: i64, att_date: NaiveDate) -> StoreResult<Option<Attendance>> {
        Ok(self.rows.lock().unwrap().get(&(employee_id, att_date)).cloned())
    }

    async fn record_check_out(&self, check_out: CheckOut) -> StoreResult<Option<Attendance>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.get_mut(&(check_out.employee_id, check_out.att_date)) else {
            return Ok(None);
        };
        if row.checkout_at.is_some() {
            return Ok(None);
        }
        if check_out.checkout_at < row.checkin_at {
            return Err(StoreError::CheckViolation {
                constraint: ATTENDANCE_CHECKOUT_ORDER.to_string(),
            });
        }

        row.checkout_at = Some(check_out.checkout_at);
        row.updated_by = check_out.actor;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

#[derive(Default)]
pub struct MemoryPayrollPeriodStore {
    rows: Mutex<Vec<PayrollPeriod>>,
    next_id: AtomicI64,
}

impl MemoryPayrollPeriodStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn snapshot(&self) -> Vec<PayrollPeriod> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl PayrollPeriodStore for MemoryPayrollPeriodStore {
    async fn any_overlapping(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.overlaps(start, end)))
    }

    async fn insert(&self, new: NewPayrollPeriod) -> StoreResult<PayrollPeriod> {
        let mut rows = self.rows.lock().unwrap();
        if new.start_date > new.end_date {
            return Err(StoreError::CheckViolation {
                constraint: PERIOD_DATE_ORDER.to_string(),
            });
        }
        if rows.iter().any(|p| p.overlaps(new.start_date, new.end_date)) {
            return Err(StoreError::ExclusionViolation {
                constraint: PERIOD_NO_OVERLAP.to_string(),
            });
        }

        let now = Utc::now();
        let period = PayrollPeriod {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            start_date: new.start_date,
            end_date: new.end_date,
            status: PayrollPeriodStatus::Draft,
            processed_at: None,
            processed_by: None,
            created_at: now,
            updated_at: now,
            created_by: new.actor,
            updated_by: new.actor,
        };
        rows.push(period.clone());
        Ok(period)
    }

    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<PayrollPeriod>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

/// Never answers; every call runs into the caller's timeout.
pub struct StalledStore;

#[async_trait]
impl AttendanceStore for StalledStore {
    async fn insert_check_in(&self, _new: NewCheckIn) -> StoreResult<Attendance> {
        std::future::pending().await
    }

    async fn find(&self, _employee_id: i64, _att_date: NaiveDate) -> StoreResult<Option<Attendance>> {
        std::future::pending().await
    }

    async fn record_check_out(&self, _check_out: CheckOut) -> StoreResult<Option<Attendance>> {
        std::future::pending().await
    }
}

#[async_trait]
impl PayrollPeriodStore for StalledStore {
    async fn any_overlapping(&self, _start: NaiveDate, _end: NaiveDate) -> StoreResult<bool> {
        std::future::pending().await
    }

    async fn insert(&self, _new: NewPayrollPeriod) -> StoreResult<PayrollPeriod> {
        std::future::pending().await
    }

    async fn list(&self, _limit: i64, _offset: i64) -> StoreResult<Vec<PayrollPeriod>> {
        std::future::pending().await
    }

    async fn count(&self) -> StoreResult<i64> {
        std::future::pending().await
    }
}

/// Always fails with a driver-level error.
pub struct BrokenStore;

#[async_trait]
impl PayrollPeriodStore for BrokenStore {
    async fn any_overlapping(&self, _start: NaiveDate, _end: NaiveDate) -> StoreResult<bool> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    async fn insert(&self, _new: NewPayrollPeriod) -> StoreResult<PayrollPeriod> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    async fn list(&self, _limit: i64, _offset: i64) -> StoreResult<Vec<PayrollPeriod>> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    async fn count(&self) -> StoreResult<i64> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }
}
