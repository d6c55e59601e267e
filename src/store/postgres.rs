use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::model::attendance::{Attendance, CheckOut, NewCheckIn};
use crate::model::payroll_period::{NewPayrollPeriod, PayrollPeriod};
use crate::store::{AttendanceStore, PayrollPeriodStore, StoreError, StoreResult};

// PostgreSQL SQLSTATE codes
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";
const EXCLUSION_VIOLATION: &str = "23P01";

/// Maps a driver error onto the store taxonomy, keeping the constraint name.
pub fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default().to_string();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::UniqueViolation { constraint },
            Some(CHECK_VIOLATION) => return StoreError::CheckViolation { constraint },
            Some(EXCLUSION_VIOLATION) => return StoreError::ExclusionViolation { constraint },
            _ => {}
        }
    }

    match err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        other => StoreError::Unavailable(other.to_string()),
    }
}

const ATTENDANCE_COLUMNS: &str = r#"
    id, employee_id, att_date, checkin_at, checkout_at,
    created_at, updated_at, created_by, updated_by
"#;

const PERIOD_COLUMNS: &str = r#"
    id, start_date, end_date, status, processed_at, processed_by,
    created_at, updated_at, created_by, updated_by
"#;

#[derive(Clone)]
pub struct PgAttendanceStore {
    pool: PgPool,
}

impl PgAttendanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn insert_check_in(&self, new: NewCheckIn) -> StoreResult<Attendance> {
        let sql = format!(
            r#"
            INSERT INTO attendance (employee_id, att_date, checkin_at, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Attendance>(&sql)
            .bind(new.employee_id)
            .bind(new.att_date)
            .bind(new.checkin_at)
            .bind(new.actor)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find(&self, employee_id: i64, att_date: NaiveDate) -> StoreResult<Option<Attendance>> {
        let sql = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance
            WHERE employee_id = $1 AND att_date = $2
            "#
        );

        sqlx::query_as::<_, Attendance>(&sql)
            .bind(employee_id)
            .bind(att_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn record_check_out(&self, check_out: CheckOut) -> StoreResult<Option<Attendance>> {
        // `checkout_at IS NULL` makes concurrent check-outs race on this row:
        // the loser matches nothing.
        let sql = format!(
            r#"
            UPDATE attendance
            SET checkout_at = $1, updated_by = $2, updated_at = now()
            WHERE employee_id = $3
              AND att_date = $4
              AND checkout_at IS NULL
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Attendance>(&sql)
            .bind(check_out.checkout_at)
            .bind(check_out.actor)
            .bind(check_out.employee_id)
            .bind(check_out.att_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }
}

#[derive(Clone)]
pub struct PgPayrollPeriodStore {
    pool: PgPool,
}

impl PgPayrollPeriodStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayrollPeriodStore for PgPayrollPeriodStore {
    async fn any_overlapping(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM payroll_periods
                WHERE start_date <= $2
                  AND end_date >= $1
            )
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn insert(&self, new: NewPayrollPeriod) -> StoreResult<PayrollPeriod> {
        let sql = format!(
            r#"
            INSERT INTO payroll_periods (start_date, end_date, created_by, updated_by)
            VALUES ($1, $2, $3, $3)
            RETURNING {PERIOD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, PayrollPeriod>(&sql)
            .bind(new.start_date)
            .bind(new.end_date)
            .bind(new.actor)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<PayrollPeriod>> {
        let sql = format!(
            r#"
            SELECT {PERIOD_COLUMNS}
            FROM payroll_periods
            ORDER BY start_date DESC
            LIMIT $1 OFFSET $2
            "#
        );

        sqlx::query_as::<_, PayrollPeriod>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn count(&self) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payroll_periods")
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }
}
