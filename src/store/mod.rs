//! Persistence seams for the attendance ledger and the payroll period registry.
//!
//! The traits report constraint violations as classified [`StoreError`]s
//! carrying the constraint name, so callers can tell a duplicate check-in
//! from an overlapping period without parsing driver messages.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::attendance::{Attendance, CheckOut, NewCheckIn};
use crate::model::payroll_period::{NewPayrollPeriod, PayrollPeriod};

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod users;

pub const ATTENDANCE_DAY_KEY: &str = "attendance_employee_date_key";
pub const ATTENDANCE_CHECKOUT_ORDER: &str = "chk_attendance_checkout_order";
pub const PERIOD_DATE_ORDER: &str = "chk_period_date_order";
pub const PERIOD_NO_OVERLAP: &str = "payroll_periods_prevent_date_overlap";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint {constraint} violated")]
    UniqueViolation { constraint: String },

    #[error("check constraint {constraint} violated")]
    CheckViolation { constraint: String },

    #[error("exclusion constraint {constraint} violated")]
    ExclusionViolation { constraint: String },

    #[error("store call timed out")]
    Timeout,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn violates(&self, name: &str) -> bool {
        match self {
            StoreError::UniqueViolation { constraint }
            | StoreError::CheckViolation { constraint }
            | StoreError::ExclusionViolation { constraint } => constraint == name,
            _ => false,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Inserts a new row; a second row for the same day key fails with a
    /// unique violation on [`ATTENDANCE_DAY_KEY`].
    async fn insert_check_in(&self, new: NewCheckIn) -> StoreResult<Attendance>;

    async fn find(&self, employee_id: i64, att_date: NaiveDate) -> StoreResult<Option<Attendance>>;

    /// Sets `checkout_at` only on a row that has none yet. `None` means the
    /// guarded update matched zero rows.
    async fn record_check_out(&self, check_out: CheckOut) -> StoreResult<Option<Attendance>>;
}

#[async_trait]
pub trait PayrollPeriodStore: Send + Sync {
    /// True when some stored period shares at least one day with `[start, end]`.
    async fn any_overlapping(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<bool>;

    /// Inserts a `draft` period. Guarded by [`PERIOD_DATE_ORDER`] and
    /// [`PERIOD_NO_OVERLAP`].
    async fn insert(&self, new: NewPayrollPeriod) -> StoreResult<PayrollPeriod>;

    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<PayrollPeriod>>;

    async fn count(&self) -> StoreResult<i64>;
}

/// Bounds a single store call; no retry is attempted on expiry.
pub async fn bounded<T, F>(limit: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match actix_web::rt::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout),
    }
}
