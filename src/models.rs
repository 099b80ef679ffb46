use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::model::{
    attendance::AttendanceStatus,
    role::Role,
    user::PublicUser,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
    #[serde(rename = "employeeId")]
    #[schema(example = "EMP000123")]
    pub employee_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// JWT payload: subject id + role, 7-day expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub role: Role,
    pub exp: usize,
}

/// Per-user, current-month aggregate. The absent count is never populated
/// from the personal endpoint: rows only exist once a check-in happens.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub half_day: u32,
    #[schema(example = 152.5)]
    pub total_hours: f64,
}

/// Manager attendance filters. Browsers send unset filters as empty strings,
/// so every field tolerates `""` as absent.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[schema(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub department: Option<String>,
}

impl AttendanceFilter {
    /// Range mode wins over single-date mode when both are present.
    pub fn is_range(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayCounts {
    pub present: i64,
    pub late: i64,
    pub half_day: i64,
    pub absent: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_employees: i64,
    pub today: TodayCounts,
}

/// One roster entry of the manager's today-status view, with the stored
/// status or an absent fallback.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayStatusEntry {
    pub id: i64,
    pub name: String,
    pub employee_id: String,
    pub department: Option<String>,
    pub status: AttendanceStatus,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<NaiveDateTime>,
}

fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
