use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::role::Role;
use crate::model::user::{EmployeeInfo, PublicUser};
use crate::models::{
    AuthResponse, DashboardStats, LoginReq, MonthlySummary, RegisterReq, TodayCounts,
    TodayStatusEntry,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Attendance API",
        version = "1.0.0",
        description = r#"
Employee attendance tracker: employees check in and out, managers view
aggregated dashboards, filter records and export CSV reports.

Most endpoints require **JWT Bearer authentication**; the `/api/manager`
endpoints additionally require the **manager** role.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::me,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::my_history,
        crate::api::attendance::my_summary,
        crate::api::attendance::today,

        crate::api::manager::list_attendance,
        crate::api::manager::export_attendance,
        crate::api::manager::employee_attendance,
        crate::api::manager::dashboard,
        crate::api::manager::today_status,
    ),
    components(
        schemas(
            RegisterReq,
            LoginReq,
            AuthResponse,
            PublicUser,
            EmployeeInfo,
            Role,
            Attendance,
            AttendanceStatus,
            MonthlySummary,
            DashboardStats,
            TodayCounts,
            TodayStatusEntry
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and current-user APIs"),
        (name = "Attendance", description = "Employee check-in/check-out APIs"),
        (name = "Manager", description = "Manager dashboards, filters and exports"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}
