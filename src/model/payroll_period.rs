use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `draft -> processed -> closed`. Only `draft` is created here; later
/// transitions belong to payroll processing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[sqlx(type_name = "payroll_period_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayrollPeriodStatus {
    #[default]
    Draft,
    Processed,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "start_date": "2024-01-01",
    "end_date": "2024-01-15",
    "status": "draft",
    "processed_at": null,
    "processed_by": null,
    "created_at": "2024-01-01T00:00:00Z",
    "updated_at": "2024-01-01T00:00:00Z",
    "created_by": 1,
    "updated_by": 1
}))]
pub struct PayrollPeriod {
    pub id: i64,

    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,

    pub status: PayrollPeriodStatus,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<i64>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,

    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

impl PayrollPeriod {
    /// Inclusive ranges intersect when each starts no later than the other ends.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

#[derive(Debug, Clone)]
pub struct NewPayrollPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub actor: Option<i64>,
}
