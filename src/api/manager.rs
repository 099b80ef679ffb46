use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::auth::auth::AuthUser;
use crate::clock::Clock;
use crate::error::ApiError;
use crate::models::{AttendanceFilter, DashboardStats};
use crate::service::{report, roster};

/// Filtered roster+attendance view. A single `date` filter joins in
/// synthesized absences; range filters return stored rows only.
#[utoipa::path(
    get,
    path = "/api/manager/attendance",
    params(
        ("date" = Option<String>, Query, description = "Single day (YYYY-MM-DD); enables absence synthesis"),
        ("startDate" = Option<String>, Query, description = "Range start (YYYY-MM-DD)"),
        ("endDate" = Option<String>, Query, description = "Range end (YYYY-MM-DD)"),
        ("status" = Option<String>, Query, description = "present | late | half-day | absent"),
        ("userId" = Option<i64>, Query, description = "Filter by employee"),
        ("department" = Option<String>, Query, description = "Filter by department")
    ),
    responses(
        (status = 200, description = "Joined attendance records"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Manager"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<AttendanceFilter>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    let records = roster::list_attendance(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// CSV export of the same filtered result set.
#[utoipa::path(
    get,
    path = "/api/manager/attendance/export",
    params(
        ("date" = Option<String>, Query, description = "Single day (YYYY-MM-DD)"),
        ("startDate" = Option<String>, Query, description = "Range start (YYYY-MM-DD)"),
        ("endDate" = Option<String>, Query, description = "Range end (YYYY-MM-DD)"),
        ("status" = Option<String>, Query, description = "present | late | half-day | absent"),
        ("userId" = Option<i64>, Query, description = "Filter by employee"),
        ("department" = Option<String>, Query, description = "Filter by department")
    ),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Manager"
)]
pub async fn export_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<AttendanceFilter>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    let records = roster::list_attendance(pool.get_ref(), &query).await?;
    let csv = report::attendance_csv(&records, query.date)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"attendance_report.csv\"",
        ))
        .body(csv))
}

/// One employee's full attendance record.
#[utoipa::path(
    get,
    path = "/api/manager/attendance/{user_id}",
    params(("user_id" = i64, Path, description = "Employee's user id")),
    responses(
        (status = 200, description = "Joined attendance records"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Manager"
)]
pub async fn employee_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    let rows = roster::employee_attendance(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/manager/dashboard",
    responses(
        (status = 200, description = "Today's company-wide counts", body = DashboardStats),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Manager"
)]
pub async fn dashboard(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    let stats = roster::dashboard(pool.get_ref(), clock.today()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    get,
    path = "/api/manager/today-status",
    responses(
        (status = 200, description = "Whole roster with today's status"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Manager"
)]
pub async fn today_status(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    let entries = roster::today_status(pool.get_ref(), clock.today()).await?;
    Ok(HttpResponse::Ok().json(entries))
}
