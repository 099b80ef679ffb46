use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

/// Full user row, password hash included. Never serialized to clients.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub employee_id: String,
    pub department: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Client-facing view of a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    pub role: Role,
    #[schema(example = "EMP000123")]
    pub employee_id: String,
    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<NaiveDateTime>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        PublicUser {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            employee_id: u.employee_id,
            department: u.department,
            created_at: u.created_at,
        }
    }
}

/// Roster projection attached to manager views, serialized as a nested
/// `User` object.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub employee_id: String,
    pub department: Option<String>,
}
