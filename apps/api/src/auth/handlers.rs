//! Axum route handlers for registration and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::issue_token;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;
use crate::validate::{is_valid_email, required_field};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /auth/register
///
/// Creates a user and returns a bearer token for it. Duplicate emails are
/// rejected before the insert so the client gets a field-level message.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let name = required_field(&request.name, "name").map_err(AppError::Validation)?;
    let email = required_field(&request.email, "email").map_err(AppError::Validation)?;
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let existing: Option<(uuid::Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Validation(
            "User with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&request.password)?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Registered user {} ({})", user.id, user.email);

    let token = issue_token(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /auth/login
///
/// Verifies credentials and returns a fresh bearer token. Unknown emails
/// and wrong passwords are indistinguishable to the caller.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = required_field(&request.email, "email").map_err(AppError::Validation)?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&state.db)
        .await?;

    let user = match user {
        Some(u) if verify_password(&request.password, &u.password_hash) => u,
        _ => return Err(AppError::Unauthorized("Invalid credentials".to_string())),
    };

    let token = issue_token(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(Json(AuthResponse { token, user }))
}
