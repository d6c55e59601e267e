use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::HrError;
use crate::model::payroll_period::PayrollPeriod;
use crate::service::payroll_period::PayrollPeriodRegistry;
use crate::validator::Validator;

/// Dates arrive as strings so a malformed one is reported per field.
#[derive(Deserialize, ToSchema)]
pub struct CreatePayrollPeriod {
    #[schema(example = "2024-01-01", format = "date")]
    pub start_date: String,

    #[schema(example = "2024-01-15", format = "date")]
    pub end_date: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollPeriodQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrollPeriodResponse {
    pub data: Vec<PayrollPeriod>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[utoipa::path(
    post,
    path = "/v1/payroll-periods",
    request_body = CreatePayrollPeriod,
    responses(
        (status = 201, description = "Payroll period created", body = Object, example = json!({
            "message": "payroll period created successfully",
            "payroll_period": {
                "id": 1,
                "start_date": "2024-01-01",
                "end_date": "2024-01-15",
                "status": "draft"
            }
        })),
        (status = 409, description = "Overlaps an existing period", body = Object, example = json!({
            "error": "overlapping date with existing period"
        })),
        (status = 422, description = "Malformed or inverted dates, or an unreadable body"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll_period(
    auth: AuthUser,
    registry: web::Data<PayrollPeriodRegistry>,
    payload: web::Json<CreatePayrollPeriod>,
) -> Result<HttpResponse, HrError> {
    auth.require_admin()?;

    let mut v = Validator::new();
    let dates = (
        v.date(&payload.start_date, "start_date"),
        v.date(&payload.end_date, "end_date"),
    );
    let (Some(start_date), Some(end_date)) = dates else {
        return Err(v.into_error());
    };

    let period = registry.insert(start_date, end_date, auth.actor()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "payroll period created successfully",
        "payroll_period": period
    })))
}

#[utoipa::path(
    get,
    path = "/v1/payroll-periods",
    params(PayrollPeriodQuery),
    responses(
        (status = 200, body = PaginatedPayrollPeriodResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payroll_periods(
    auth: AuthUser,
    registry: web::Data<PayrollPeriodRegistry>,
    query: web::Query<PayrollPeriodQuery>,
) -> Result<HttpResponse, HrError> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let (data, total) = registry.list(page, per_page).await?;

    Ok(HttpResponse::Ok().json(PaginatedPayrollPeriodResponse {
        data,
        page,
        per_page,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::json_error;
    use crate::model::role::Role;
    use crate::store::memory::MemoryPayrollPeriodStore;
    use actix_web::body::BoxBody;
    use actix_web::dev::{ServiceRequest, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::middleware::{Next, from_fn};
    use actix_web::{App, HttpMessage, test};
    use std::sync::Arc;
    use std::time::Duration;

    // Replaces the JWT middleware: the caller's role comes from `x-test-role`.
    async fn as_role(
        req: ServiceRequest,
        next: Next<BoxBody>,
    ) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
        let role = match req.headers().get("x-test-role").and_then(|h| h.to_str().ok()) {
            Some("employee") => Role::Employee,
            _ => Role::Admin,
        };
        req.extensions_mut().insert(AuthUser {
            user_id: 1,
            email: "admin@example.com".into(),
            role,
        });
        next.call(req).await
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::JsonConfig::default().error_handler(json_error))
                    .app_data(web::Data::new(PayrollPeriodRegistry::new(
                        Arc::new(MemoryPayrollPeriodStore::default()),
                        Duration::from_secs(1),
                    )))
                    .service(
                        web::resource("/v1/payroll-periods")
                            .wrap(from_fn(as_role))
                            .route(web::post().to(create_payroll_period))
                            .route(web::get().to(list_payroll_periods)),
                    ),
            )
            .await
        };
    }

    fn create(start: &str, end: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/v1/payroll-periods")
            .set_json(json!({ "start_date": start, "end_date": end }))
    }

    #[actix_web::test]
    async fn create_overlap_and_adjacent() {
        let app = app!();

        let resp = test::call_service(&app, create("2024-01-01", "2024-01-15").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["payroll_period"]["status"], "draft");
        assert_eq!(body["payroll_period"]["created_by"], 1);

        let resp = test::call_service(&app, create("2024-01-10", "2024-01-20").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = test::call_service(&app, create("2024-01-16", "2024-01-31").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/v1/payroll-periods?page=1&per_page=10")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"][0]["start_date"], "2024-01-16");
    }

    #[actix_web::test]
    async fn bad_dates_are_unprocessable() {
        let app = app!();

        let resp = test::call_service(&app, create("2024-01-15", "2024-01-01").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = test::call_service(&app, create("2024-13-01", "15/01/2024").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["start_date"], "must be a valid date (YYYY-MM-DD)");
        assert_eq!(body["error"]["end_date"], "must be a valid date (YYYY-MM-DD)");
    }

    #[actix_web::test]
    async fn unreadable_bodies_are_unprocessable_json() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/v1/payroll-periods")
            .set_json(json!({ "start_date": "2024-01-01" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"]["body"].as_str().unwrap().contains("end_date"));

        let req = test::TestRequest::post()
            .uri("/v1/payroll-periods")
            .set_payload("start_date=2024-01-01")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"]["body"].is_string());
    }

    #[actix_web::test]
    async fn employees_cannot_manage_periods() {
        let app = app!();

        let req = create("2024-01-01", "2024-01-15")
            .insert_header(("x-test-role", "employee"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
