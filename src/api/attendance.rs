use crate::auth::auth::AuthUser;
use crate::clock::Clock;
use crate::error::HrError;
use crate::service::attendance::AttendanceLedger;
use actix_web::{HttpResponse, web};
use serde_json::json;

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/v1/attendance/check-in",
    responses(
        (status = 201, description = "Checked in successfully", body = Object, example = json!({
            "message": "checked-in successfully",
            "attendance": {
                "id": 1,
                "employee_id": 42,
                "att_date": "2024-01-08",
                "checkin_at": "2024-01-08T02:00:00Z",
                "checkout_at": null
            }
        })),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "error": "employee has already checked in on the date"
        })),
        (status = 422, description = "Weekend", body = Object, example = json!({
            "error": "attendance cannot be recorded on the weekend"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 504, description = "Store timeout"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    ledger: web::Data<AttendanceLedger>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, HrError> {
    auth.require_employee()?;

    let attendance = ledger
        .record_check_in(auth.user_id, clock.now(), auth.actor())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "checked-in successfully",
        "attendance": attendance
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/v1/attendance/check-out",
    responses(
        (status = 201, description = "Checked out successfully", body = Object, example = json!({
            "message": "checked-out successfully",
            "attendance": {
                "id": 1,
                "employee_id": 42,
                "att_date": "2024-01-08",
                "checkin_at": "2024-01-08T02:00:00Z",
                "checkout_at": "2024-01-08T11:00:00Z"
            }
        })),
        (status = 404, description = "No check-in found for today", body = Object, example = json!({
            "error": "no check-in data for the date"
        })),
        (status = 409, description = "Already checked out today", body = Object, example = json!({
            "error": "employee has already checked out on the date"
        })),
        (status = 422, description = "Weekend"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 504, description = "Store timeout"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    ledger: web::Data<AttendanceLedger>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, HrError> {
    auth.require_employee()?;

    let attendance = ledger
        .record_check_out(auth.user_id, clock.now(), auth.actor())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "checked-out successfully",
        "attendance": attendance
    })))
}
