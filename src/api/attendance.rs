use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::auth::auth::AuthUser;
use crate::clock::Clock;
use crate::error::ApiError;
use crate::model::attendance::Attendance;
use crate::models::MonthlySummary;
use crate::service::attendance;

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    responses(
        (status = 201, description = "Checked in", body = Attendance),
        (status = 400, description = "Already checked in for today", body = Object, example = json!({
            "message": "Already checked in for today"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, ApiError> {
    let record = attendance::check_in(pool.get_ref(), auth.id, clock.now()).await?;
    Ok(HttpResponse::Created().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    responses(
        (status = 200, description = "Checked out", body = Attendance),
        (status = 400, description = "No check-in record found for today", body = Object, example = json!({
            "message": "No check-in record found for today"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, ApiError> {
    let record = attendance::check_out(pool.get_ref(), auth.id, clock.now()).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    get,
    path = "/api/attendance/my-history",
    responses(
        (status = 200, description = "Caller's attendance rows, newest first"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_history(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let rows = attendance::history(pool.get_ref(), auth.id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/attendance/my-summary",
    responses(
        (status = 200, description = "Current-month summary", body = MonthlySummary),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_summary(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, ApiError> {
    let summary = attendance::monthly_summary(pool.get_ref(), auth.id, clock.today()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's row, or {\"status\": \"not-marked\"}"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, ApiError> {
    let record = attendance::today_record(pool.get_ref(), auth.id, clock.today()).await?;
    match record {
        Some(row) => Ok(HttpResponse::Ok().json(row)),
        None => Ok(HttpResponse::Ok().json(json!({ "status": "not-marked" }))),
    }
}
