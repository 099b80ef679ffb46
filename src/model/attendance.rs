use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::user::EmployeeInfo;

/// Attendance classification. Derived from check-in time and elapsed hours,
/// never settable directly by a client.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Late,
    HalfDay,
    Absent,
}

/// One attendance row. At most one per (user_id, date), enforced by a
/// unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub user_id: i64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub check_in_time: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out_time: Option<NaiveDateTime>,
    pub status: AttendanceStatus,
    #[schema(example = 8.25, nullable = true)]
    pub total_hours: Option<f64>,
}

/// Attendance row joined with its owner, as the manager endpoints return it.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceWithUser {
    #[serde(flatten)]
    pub record: Attendance,
    #[serde(rename = "User")]
    pub user: EmployeeInfo,
}

/// Placeholder for an employee with no attendance row on the queried day.
/// Never persisted; serializes with a null id so clients can tell it from
/// a stored row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsentEntry {
    pub id: Option<i64>,
    pub status: AttendanceStatus,
    pub check_in_time: Option<NaiveDateTime>,
    pub check_out_time: Option<NaiveDateTime>,
    #[serde(rename = "User")]
    pub user: EmployeeInfo,
}

impl AbsentEntry {
    pub fn for_employee(user: EmployeeInfo) -> Self {
        AbsentEntry {
            id: None,
            status: AttendanceStatus::Absent,
            check_in_time: None,
            check_out_time: None,
            user,
        }
    }
}

/// A manager-view entry for one employee and one day: either a stored row
/// or a synthesized absence.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DayRecord {
    Recorded(AttendanceWithUser),
    Absent(AbsentEntry),
}

impl DayRecord {
    pub fn user(&self) -> &EmployeeInfo {
        match self {
            DayRecord::Recorded(r) => &r.user,
            DayRecord::Absent(a) => &a.user,
        }
    }

    pub fn status(&self) -> AttendanceStatus {
        match self {
            DayRecord::Recorded(r) => r.record.status,
            DayRecord::Absent(a) => a.status,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DayRecord::Recorded(r) => Some(r.record.date),
            DayRecord::Absent(_) => None,
        }
    }

    pub fn check_in_time(&self) -> Option<NaiveDateTime> {
        match self {
            DayRecord::Recorded(r) => Some(r.record.check_in_time),
            DayRecord::Absent(_) => None,
        }
    }

    pub fn check_out_time(&self) -> Option<NaiveDateTime> {
        match self {
            DayRecord::Recorded(r) => r.record.check_out_time,
            DayRecord::Absent(_) => None,
        }
    }

    pub fn total_hours(&self) -> Option<f64> {
        match self {
            DayRecord::Recorded(r) => r.record.total_hours,
            DayRecord::Absent(_) => None,
        }
    }
}
