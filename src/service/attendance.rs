use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::models::MonthlySummary;

/// Fixed wall-clock cutoff: checking in after 09:30 local counts as late.
fn late_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 30, 0).expect("valid cutoff time")
}

/// Hours below which a completed day is reclassified as half-day.
const HALF_DAY_HOURS: f64 = 4.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// First and last calendar day of the month containing `today`.
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).expect("valid month start");
    let next_month = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    }
    .expect("valid month start");
    let last = next_month.pred_opt().expect("valid month end");
    (first, last)
}

const ATTENDANCE_COLUMNS: &str =
    "id, user_id, date, check_in_time, check_out_time, status, total_hours";

/// Creates today's row. The UNIQUE(user_id, date) constraint turns a
/// concurrent duplicate into AlreadyCheckedIn instead of a second row.
pub async fn check_in(
    pool: &SqlitePool,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<Attendance, ApiError> {
    let status = if now.time() <= late_cutoff() {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::Late
    };

    let sql = format!(
        "INSERT INTO attendance (user_id, date, check_in_time, status) \
         VALUES (?, ?, ?, ?) RETURNING {ATTENDANCE_COLUMNS}"
    );

    let result = sqlx::query_as::<_, Attendance>(&sql)
        .bind(user_id)
        .bind(now.date())
        .bind(now)
        .bind(status)
        .fetch_one(pool)
        .await;

    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(ApiError::AlreadyCheckedIn)
        }
        Err(e) => Err(e.into()),
    }
}

/// Closes today's row: sets the check-out time and total hours, and
/// overwrites the status to half-day when fewer than four hours were
/// worked. A late check-in that worked a full day stays late.
pub async fn check_out(
    pool: &SqlitePool,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<Attendance, ApiError> {
    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE user_id = ? AND date = ?");

    let record = sqlx::query_as::<_, Attendance>(&sql)
        .bind(user_id)
        .bind(now.date())
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NoCheckInRecord)?;

    if record.check_out_time.is_some() {
        return Err(ApiError::AlreadyCheckedOut);
    }

    let elapsed = now - record.check_in_time;
    let total_hours = round2(elapsed.num_milliseconds() as f64 / 3_600_000.0);

    let status = if total_hours < HALF_DAY_HOURS {
        AttendanceStatus::HalfDay
    } else {
        record.status
    };

    let sql = format!(
        "UPDATE attendance SET check_out_time = ?, total_hours = ?, status = ? \
         WHERE id = ? RETURNING {ATTENDANCE_COLUMNS}"
    );

    let updated = sqlx::query_as::<_, Attendance>(&sql)
        .bind(now)
        .bind(total_hours)
        .bind(status)
        .bind(record.id)
        .fetch_one(pool)
        .await?;

    Ok(updated)
}

/// All of the caller's rows, newest day first.
pub async fn history(pool: &SqlitePool, user_id: i64) -> Result<Vec<Attendance>, ApiError> {
    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE user_id = ? ORDER BY date DESC"
    );

    let rows = sqlx::query_as::<_, Attendance>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Current-month tallies per status plus total hours. Hours are summed
/// first and rounded once at the end.
pub async fn monthly_summary(
    pool: &SqlitePool,
    user_id: i64,
    today: NaiveDate,
) -> Result<MonthlySummary, ApiError> {
    let (first, last) = month_bounds(today);

    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
         WHERE user_id = ? AND date BETWEEN ? AND ?"
    );

    let rows = sqlx::query_as::<_, Attendance>(&sql)
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_all(pool)
        .await?;

    let mut summary = MonthlySummary::default();
    for record in &rows {
        match record.status {
            AttendanceStatus::Present => summary.present += 1,
            AttendanceStatus::Absent => summary.absent += 1,
            AttendanceStatus::Late => summary.late += 1,
            AttendanceStatus::HalfDay => summary.half_day += 1,
        }
        if let Some(hours) = record.total_hours {
            summary.total_hours += hours;
        }
    }
    summary.total_hours = round2(summary.total_hours);

    Ok(summary)
}

/// Today's row for the caller, if any.
pub async fn today_record(
    pool: &SqlitePool,
    user_id: i64,
    today: NaiveDate,
) -> Result<Option<Attendance>, ApiError> {
    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE user_id = ? AND date = ?");

    let row = sqlx::query_as::<_, Attendance>(&sql)
        .bind(user_id)
        .bind(today)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}
