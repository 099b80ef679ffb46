use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_token,
        password::{hash_password, verify_password},
    },
    clock::Clock,
    config::Config,
    error::ApiError,
    model::{
        role::Role,
        user::{PublicUser, User},
    },
    models::{AuthResponse, LoginReq, RegisterReq},
};

fn generate_employee_id(now_millis: i64) -> String {
    // EMP + last six digits of the epoch-millis timestamp
    format!("EMP{:06}", now_millis.rem_euclid(1_000_000))
}

/// User registration handler
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Email already in use", body = Object, example = json!({
            "message": "Email already in use"
        }))
    ),
    tag = "Auth"
)]
pub async fn register(
    body: web::Json<RegisterReq>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, ApiError> {
    let name = body.name.trim();
    let email = body.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "name, email and password are required".into(),
        ));
    }

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(pool.get_ref())
    .await?;

    if exists {
        return Err(ApiError::EmailTaken);
    }

    let hashed = hash_password(&body.password).map_err(|_| ApiError::Internal)?;
    let role = body.role.unwrap_or(Role::Employee);
    let employee_id = body
        .employee_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| generate_employee_id(clock.now().and_utc().timestamp_millis()));

    let result = sqlx::query_as::<_, PublicUser>(
        r#"
        INSERT INTO users (name, email, password, role, employee_id, department)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, name, email, role, employee_id, department, created_at
        "#,
    )
    .bind(name)
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .bind(&employee_id)
    .bind(&body.department)
    .fetch_one(pool.get_ref())
    .await;

    let user = match result {
        Ok(user) => user,
        // Concurrent registration with the same email loses to the
        // unique constraint.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(ApiError::EmailTaken)
        }
        Err(e) => return Err(e.into()),
    };

    let token = generate_token(user.id, user.role, &config.jwt_secret, config.token_ttl)?;

    info!(user_id = user.id, "User registered");

    Ok(HttpResponse::Created().json(AuthResponse { user, token }))
}

/// Login handler. Unknown email and wrong password produce the same
/// "Invalid credentials" response.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Invalid credentials", body = Object, example = json!({
            "message": "Invalid credentials"
        }))
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(body, pool, config))]
pub async fn login(
    body: web::Json<LoginReq>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let email = body.email.trim().to_lowercase();

    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation("email and password are required".into()));
    }

    debug!("Fetching user from database");

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role, employee_id, department, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(&email)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

    if verify_password(&body.password, &user.password).is_err() {
        info!(user_id = user.id, "Password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    let token = generate_token(user.id, user.role, &config.jwt_secret, config.token_ttl)?;

    info!(user_id = user.id, "Login successful");

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Current-user handler. A valid token whose subject no longer exists is
/// treated as unauthorized.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = PublicUser),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser, pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let user = sqlx::query_as::<_, PublicUser>(
        r#"
        SELECT id, name, email, role, employee_id, department, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(auth.id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(HttpResponse::Ok().json(user))
}
