use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::ApiError;
use crate::model::attendance::{
    AbsentEntry, Attendance, AttendanceStatus, AttendanceWithUser, DayRecord,
};
use crate::model::user::EmployeeInfo;
use crate::models::{AttendanceFilter, DashboardStats, TodayCounts, TodayStatusEntry};

/// Bindable argument for dynamically built WHERE clauses. SQLite compares
/// by storage class, so integers must not be bound as text.
enum SqlArg {
    Int(i64),
    Text(String),
    Date(NaiveDate),
}

impl From<i64> for SqlArg {
    fn from(v: i64) -> Self {
        SqlArg::Int(v)
    }
}

impl From<String> for SqlArg {
    fn from(v: String) -> Self {
        SqlArg::Text(v)
    }
}

impl From<NaiveDate> for SqlArg {
    fn from(v: NaiveDate) -> Self {
        SqlArg::Date(v)
    }
}

/// Flat projection of the attendance-user join.
#[derive(sqlx::FromRow)]
struct JoinedRow {
    id: i64,
    user_id: i64,
    date: NaiveDate,
    check_in_time: chrono::NaiveDateTime,
    check_out_time: Option<chrono::NaiveDateTime>,
    status: AttendanceStatus,
    total_hours: Option<f64>,
    name: String,
    email: String,
    employee_id: String,
    department: Option<String>,
}

impl From<JoinedRow> for AttendanceWithUser {
    fn from(row: JoinedRow) -> Self {
        AttendanceWithUser {
            record: Attendance {
                id: row.id,
                user_id: row.user_id,
                date: row.date,
                check_in_time: row.check_in_time,
                check_out_time: row.check_out_time,
                status: row.status,
                total_hours: row.total_hours,
            },
            user: EmployeeInfo {
                id: row.user_id,
                name: row.name,
                email: row.email,
                employee_id: row.employee_id,
                department: row.department,
            },
        }
    }
}

async fn fetch_joined(
    pool: &SqlitePool,
    conditions: Vec<&'static str>,
    bindings: Vec<SqlArg>,
) -> Result<Vec<AttendanceWithUser>, ApiError> {
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT a.id, a.user_id, a.date, a.check_in_time, a.check_out_time, \
                a.status, a.total_hours, \
                u.name, u.email, u.employee_id, u.department \
         FROM attendance a \
         JOIN users u ON u.id = a.user_id \
         {where_clause} \
         ORDER BY a.date DESC, u.name ASC"
    );
    debug!(sql = %sql, "Fetching joined attendance");

    let mut query = sqlx::query_as::<_, JoinedRow>(&sql);
    for arg in bindings {
        query = match arg {
            SqlArg::Int(v) => query.bind(v),
            SqlArg::Text(v) => query.bind(v),
            SqlArg::Date(v) => query.bind(v),
        };
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

async fn fetch_roster(
    pool: &SqlitePool,
    department: Option<&str>,
    user_id: Option<i64>,
) -> Result<Vec<EmployeeInfo>, ApiError> {
    let mut conditions = vec!["role = ?"];
    let mut bindings: Vec<SqlArg> = vec![SqlArg::Text("employee".into())];

    if let Some(department) = department {
        conditions.push("department = ?");
        bindings.push(SqlArg::Text(department.to_string()));
    }
    if let Some(user_id) = user_id {
        conditions.push("id = ?");
        bindings.push(SqlArg::Int(user_id));
    }

    let sql = format!(
        "SELECT id, name, email, employee_id, department FROM users WHERE {} ORDER BY name ASC",
        conditions.join(" AND ")
    );

    let mut query = sqlx::query_as::<_, EmployeeInfo>(&sql);
    for arg in bindings {
        query = match arg {
            SqlArg::Int(v) => query.bind(v),
            SqlArg::Text(v) => query.bind(v),
            SqlArg::Date(v) => query.bind(v),
        };
    }

    let roster = query.fetch_all(pool).await?;
    Ok(roster)
}

/// Filtered manager view. With a single `date` filter the roster is joined
/// in and employees without a row that day are materialized as absences;
/// range queries return stored rows only and never synthesize.
pub async fn list_attendance(
    pool: &SqlitePool,
    filter: &AttendanceFilter,
) -> Result<Vec<DayRecord>, ApiError> {
    if !filter.is_range() {
        if let Some(date) = filter.date {
            return single_day(pool, date, filter).await;
        }
    }

    let mut conditions = Vec::new();
    let mut bindings: Vec<SqlArg> = Vec::new();

    match (filter.start_date, filter.end_date) {
        (Some(start), Some(end)) => {
            conditions.push("a.date BETWEEN ? AND ?");
            bindings.push(start.into());
            bindings.push(end.into());
        }
        (Some(start), None) => {
            conditions.push("a.date >= ?");
            bindings.push(start.into());
        }
        (None, Some(end)) => {
            conditions.push("a.date <= ?");
            bindings.push(end.into());
        }
        (None, None) => {
            if let Some(date) = filter.date {
                conditions.push("a.date = ?");
                bindings.push(date.into());
            }
        }
    }

    if let Some(status) = filter.status {
        conditions.push("a.status = ?");
        bindings.push(SqlArg::Text(status.to_string()));
    }
    if let Some(user_id) = filter.user_id {
        conditions.push("a.user_id = ?");
        bindings.push(user_id.into());
    }
    if let Some(department) = &filter.department {
        conditions.push("u.department = ?");
        bindings.push(SqlArg::Text(department.clone()));
    }

    let rows = fetch_joined(pool, conditions, bindings).await?;
    Ok(rows.into_iter().map(DayRecord::Recorded).collect())
}

async fn single_day(
    pool: &SqlitePool,
    date: NaiveDate,
    filter: &AttendanceFilter,
) -> Result<Vec<DayRecord>, ApiError> {
    // The status filter is applied after the roster diff: absence is
    // defined by having no row at all that day, whatever its status.
    let mut conditions = vec!["a.date = ?"];
    let mut bindings: Vec<SqlArg> = vec![date.into()];

    if let Some(user_id) = filter.user_id {
        conditions.push("a.user_id = ?");
        bindings.push(user_id.into());
    }
    if let Some(department) = &filter.department {
        conditions.push("u.department = ?");
        bindings.push(SqlArg::Text(department.clone()));
    }

    let recorded = fetch_joined(pool, conditions, bindings).await?;

    let roster = fetch_roster(pool, filter.department.as_deref(), filter.user_id).await?;
    let marked: HashSet<i64> = recorded.iter().map(|r| r.record.user_id).collect();
    let synthetic: Vec<DayRecord> = roster
        .into_iter()
        .filter(|emp| !marked.contains(&emp.id))
        .map(|emp| DayRecord::Absent(AbsentEntry::for_employee(emp)))
        .collect();

    match filter.status {
        Some(AttendanceStatus::Absent) => Ok(synthetic),
        Some(status) => Ok(recorded
            .into_iter()
            .filter(|r| r.record.status == status)
            .map(DayRecord::Recorded)
            .collect()),
        None => {
            let mut all: Vec<DayRecord> =
                recorded.into_iter().map(DayRecord::Recorded).collect();
            all.extend(synthetic);
            Ok(all)
        }
    }
}

/// One employee's full record, joined with the roster entry.
pub async fn employee_attendance(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<AttendanceWithUser>, ApiError> {
    fetch_joined(pool, vec!["a.user_id = ?"], vec![user_id.into()]).await
}

/// Company-wide counts for today. Recomputed independently of the
/// single-day synthesis: absent is the roster size minus rows stored
/// today, floored at zero.
pub async fn dashboard(pool: &SqlitePool, today: NaiveDate) -> Result<DashboardStats, ApiError> {
    let total_employees =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'employee'")
            .fetch_one(pool)
            .await?;

    let statuses =
        sqlx::query_scalar::<_, AttendanceStatus>("SELECT status FROM attendance WHERE date = ?")
            .bind(today)
            .fetch_all(pool)
            .await?;

    let count = |wanted: AttendanceStatus| statuses.iter().filter(|s| **s == wanted).count() as i64;
    let marked = statuses.len() as i64;

    Ok(DashboardStats {
        total_employees,
        today: TodayCounts {
            present: count(AttendanceStatus::Present),
            late: count(AttendanceStatus::Late),
            half_day: count(AttendanceStatus::HalfDay),
            absent: (total_employees - marked).max(0),
        },
    })
}

/// Whole roster with today's status, falling back to absent for
/// employees without a row.
pub async fn today_status(
    pool: &SqlitePool,
    today: NaiveDate,
) -> Result<Vec<TodayStatusEntry>, ApiError> {
    let roster = fetch_roster(pool, None, None).await?;

    let rows = sqlx::query_as::<_, Attendance>(
        "SELECT id, user_id, date, check_in_time, check_out_time, status, total_hours \
         FROM attendance WHERE date = ?",
    )
    .bind(today)
    .fetch_all(pool)
    .await?;

    let by_user: HashMap<i64, &Attendance> = rows.iter().map(|r| (r.user_id, r)).collect();

    let entries = roster
        .into_iter()
        .map(|emp| match by_user.get(&emp.id) {
            Some(record) => TodayStatusEntry {
                id: emp.id,
                name: emp.name,
                employee_id: emp.employee_id,
                department: emp.department,
                status: record.status,
                check_in_time: Some(record.check_in_time),
                check_out_time: record.check_out_time,
            },
            None => TodayStatusEntry {
                id: emp.id,
                name: emp.name,
                employee_id: emp.employee_id,
                department: emp.department,
                status: AttendanceStatus::Absent,
                check_in_time: None,
                check_out_time: None,
            },
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::service::attendance::{check_in, check_out};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    async fn seed_user(pool: &SqlitePool, name: &str, role: &str, department: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, email, password, role, employee_id, department) \
             VALUES (?, ?, 'x', ?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(format!("{}@co.io", name.to_lowercase()))
        .bind(role)
        .bind(format!("EMP-{name}"))
        .bind(department)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn at(date: &str, time: &str) -> chrono::NaiveDateTime {
        format!("{date}T{time}").parse().unwrap()
    }

    fn day(date: &str) -> NaiveDate {
        date.parse().unwrap()
    }

    fn date_filter(date: &str) -> AttendanceFilter {
        AttendanceFilter {
            date: Some(day(date)),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn single_day_union_covers_roster_without_duplicates() {
        let pool = test_pool().await;
        let ann = seed_user(&pool, "Ann", "employee", "Engineering").await;
        let bob = seed_user(&pool, "Bob", "employee", "Engineering").await;
        check_in(&pool, ann, at("2026-08-25", "09:00:00")).await.unwrap();

        let records = list_attendance(&pool, &date_filter("2026-08-25")).await.unwrap();
        assert_eq!(records.len(), 2);

        let recorded: Vec<i64> = records
            .iter()
            .filter(|r| matches!(r, DayRecord::Recorded(_)))
            .map(|r| r.user().id)
            .collect();
        let absent: Vec<i64> = records
            .iter()
            .filter(|r| matches!(r, DayRecord::Absent(_)))
            .map(|r| r.user().id)
            .collect();
        assert_eq!(recorded, vec![ann]);
        assert_eq!(absent, vec![bob]);
    }

    #[actix_web::test]
    async fn absent_filter_returns_only_synthetic_entries() {
        let pool = test_pool().await;
        let ann = seed_user(&pool, "Ann", "employee", "Engineering").await;
        let bob = seed_user(&pool, "Bob", "employee", "Engineering").await;
        check_in(&pool, ann, at("2026-08-25", "09:00:00")).await.unwrap();

        let mut filter = date_filter("2026-08-25");
        filter.status = Some(AttendanceStatus::Absent);
        let records = list_attendance(&pool, &filter).await.unwrap();

        assert_eq!(records.len(), 1);
        assert!(matches!(records[0], DayRecord::Absent(_)));
        assert_eq!(records[0].user().id, bob);
        assert_eq!(records[0].status(), AttendanceStatus::Absent);
    }

    #[actix_web::test]
    async fn status_filter_returns_only_matching_real_rows() {
        let pool = test_pool().await;
        let ann = seed_user(&pool, "Ann", "employee", "Engineering").await;
        let bob = seed_user(&pool, "Bob", "employee", "Engineering").await;
        seed_user(&pool, "Cat", "employee", "Engineering").await;
        check_in(&pool, ann, at("2026-08-25", "09:00:00")).await.unwrap();
        check_in(&pool, bob, at("2026-08-25", "10:15:00")).await.unwrap();

        let mut filter = date_filter("2026-08-25");
        filter.status = Some(AttendanceStatus::Late);
        let records = list_attendance(&pool, &filter).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user().id, bob);
        assert!(matches!(records[0], DayRecord::Recorded(_)));
    }

    #[actix_web::test]
    async fn range_queries_never_synthesize_absences() {
        let pool = test_pool().await;
        let ann = seed_user(&pool, "Ann", "employee", "Engineering").await;
        seed_user(&pool, "Bob", "employee", "Engineering").await;
        check_in(&pool, ann, at("2026-08-24", "09:00:00")).await.unwrap();

        let filter = AttendanceFilter {
            start_date: Some(day("2026-08-24")),
            end_date: Some(day("2026-08-26")),
            ..Default::default()
        };
        let records = list_attendance(&pool, &filter).await.unwrap();

        assert_eq!(records.len(), 1);
        assert!(records
            .iter()
            .all(|r| matches!(r, DayRecord::Recorded(_))));
    }

    #[actix_web::test]
    async fn department_filter_limits_real_rows_and_roster() {
        let pool = test_pool().await;
        let ann = seed_user(&pool, "Ann", "employee", "Engineering").await;
        seed_user(&pool, "Bob", "employee", "Sales").await;
        let cat = seed_user(&pool, "Cat", "employee", "Engineering").await;
        check_in(&pool, ann, at("2026-08-25", "09:00:00")).await.unwrap();

        let mut filter = date_filter("2026-08-25");
        filter.department = Some("Engineering".into());
        let records = list_attendance(&pool, &filter).await.unwrap();

        let ids: HashSet<i64> = records.iter().map(|r| r.user().id).collect();
        assert_eq!(ids, HashSet::from([ann, cat]));
    }

    #[actix_web::test]
    async fn managers_are_not_part_of_the_roster() {
        let pool = test_pool().await;
        seed_user(&pool, "Ann", "employee", "Engineering").await;
        seed_user(&pool, "Meg", "manager", "Engineering").await;

        let records = list_attendance(&pool, &date_filter("2026-08-25")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user().name, "Ann");
    }

    #[actix_web::test]
    async fn dashboard_counts_and_floors_absent_at_zero() {
        let pool = test_pool().await;
        let ann = seed_user(&pool, "Ann", "employee", "Engineering").await;
        let bob = seed_user(&pool, "Bob", "employee", "Engineering").await;
        let cat = seed_user(&pool, "Cat", "employee", "Sales").await;
        let meg = seed_user(&pool, "Meg", "manager", "Engineering").await;

        check_in(&pool, ann, at("2026-08-25", "09:00:00")).await.unwrap();
        check_in(&pool, bob, at("2026-08-25", "10:30:00")).await.unwrap();

        let stats = dashboard(&pool, day("2026-08-25")).await.unwrap();
        assert_eq!(stats.total_employees, 3);
        assert_eq!(stats.today.present, 1);
        assert_eq!(stats.today.late, 1);
        assert_eq!(stats.today.half_day, 0);
        assert_eq!(stats.today.absent, 1);

        // managers checking in can push marked rows past the employee
        // count; absent is floored rather than going negative
        check_in(&pool, meg, at("2026-08-25", "08:00:00")).await.unwrap();
        check_in(&pool, cat, at("2026-08-25", "09:10:00")).await.unwrap();

        let stats = dashboard(&pool, day("2026-08-25")).await.unwrap();
        assert_eq!(stats.today.absent, 0);
    }

    #[actix_web::test]
    async fn short_day_shows_as_half_day_in_single_day_view() {
        let pool = test_pool().await;
        let ann = seed_user(&pool, "Ann", "employee", "Engineering").await;
        check_in(&pool, ann, at("2026-08-25", "09:00:00")).await.unwrap();
        check_out(&pool, ann, at("2026-08-25", "12:00:00")).await.unwrap();

        let records = list_attendance(&pool, &date_filter("2026-08-25")).await.unwrap();
        assert_eq!(records[0].status(), AttendanceStatus::HalfDay);
        assert_eq!(records[0].total_hours(), Some(3.0));
    }

    #[actix_web::test]
    async fn today_status_covers_the_full_roster() {
        let pool = test_pool().await;
        let ann = seed_user(&pool, "Ann", "employee", "Engineering").await;
        let bob = seed_user(&pool, "Bob", "employee", "Sales").await;
        check_in(&pool, ann, at("2026-08-25", "09:00:00")).await.unwrap();

        let entries = today_status(&pool, day("2026-08-25")).await.unwrap();
        assert_eq!(entries.len(), 2);

        let ann_entry = entries.iter().find(|e| e.id == ann).unwrap();
        assert_eq!(ann_entry.status, AttendanceStatus::Present);
        assert!(ann_entry.check_in_time.is_some());

        let bob_entry = entries.iter().find(|e| e.id == bob).unwrap();
        assert_eq!(bob_entry.status, AttendanceStatus::Absent);
        assert!(bob_entry.check_in_time.is_none());
    }

    #[actix_web::test]
    async fn employee_attendance_joins_the_roster_entry() {
        let pool = test_pool().await;
        let ann = seed_user(&pool, "Ann", "employee", "Engineering").await;
        check_in(&pool, ann, at("2026-08-24", "09:00:00")).await.unwrap();
        check_in(&pool, ann, at("2026-08-25", "09:45:00")).await.unwrap();

        let rows = employee_attendance(&pool, ann).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].record.date, day("2026-08-25"));
        assert_eq!(rows[0].user.name, "Ann");
    }
}
