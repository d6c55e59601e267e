use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee's attendance for one business day.
///
/// Keyed by `(employee_id, att_date)`; `checkout_at` is written at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 42,
    "att_date": "2024-01-08",
    "checkin_at": "2024-01-08T02:00:00Z",
    "checkout_at": null,
    "created_at": "2024-01-08T02:00:00Z",
    "updated_at": "2024-01-08T02:00:00Z",
    "created_by": 42,
    "updated_by": 42
}))]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,

    #[schema(value_type = String, format = "date")]
    pub att_date: NaiveDate,

    #[schema(value_type = String, format = "date-time")]
    pub checkin_at: DateTime<Utc>,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub checkout_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,

    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

/// Values the ledger writes on check-in; the store assigns the rest.
#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub employee_id: i64,
    pub att_date: NaiveDate,
    pub checkin_at: DateTime<Utc>,
    pub actor: Option<i64>,
}

/// Values the ledger writes on check-out.
#[derive(Debug, Clone)]
pub struct CheckOut {
    pub employee_id: i64,
    pub att_date: NaiveDate,
    pub checkout_at: DateTime<Utc>,
    pub actor: Option<i64>,
}
