use crate::api::payroll_period::{
    CreatePayrollPeriod, PaginatedPayrollPeriodResponse, PayrollPeriodQuery,
};
use crate::model::attendance::Attendance;
use crate::model::payroll_period::{PayrollPeriod, PayrollPeriodStatus};
use crate::model::role::Role;
use crate::models::{LoginReqDto, RegisterUserReq, TokenPair};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Admin API",
        version = "1.0.0",
        description = r#"
## HR Administration Backend

Attendance and payroll-period administration for a single organization.

### 🔹 Key Features
- **Attendance**
  - One check-in and one check-out per employee per business day
  - Weekends are rejected in the business timezone
- **Payroll Periods**
  - Non-overlapping date ranges, created as drafts
  - Paginated listing, newest period first
- **Users**
  - Admins register employees and other admins

### 🔐 Security
Every endpoint except `/v1/health` and `/auth/*` requires a **JWT Bearer** access token.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::register,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,

        crate::api::payroll_period::create_payroll_period,
        crate::api::payroll_period::list_payroll_periods
    ),
    components(
        schemas(
            Attendance,
            PayrollPeriod,
            PayrollPeriodStatus,
            Role,
            CreatePayrollPeriod,
            PayrollPeriodQuery,
            PaginatedPayrollPeriodResponse,
            LoginReqDto,
            RegisterUserReq,
            TokenPair
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Auth", description = "Login and token rotation"),
        (name = "Users", description = "User registration"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Payroll", description = "Payroll period management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
