//! Admin user management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::extract::AdminUser;
use crate::auth::password::hash_password;
use crate::errors::AppError;
use crate::models::user::{User, UserWithSkills};
use crate::profile::handlers::{fetch_profile, replace_user_skills};
use crate::state::AppState;
use crate::validate::{is_valid_email, required_field};

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}

/// GET /api/admin/users?search=
pub async fn handle_list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<UserSearchQuery>,
) -> Result<Json<Vec<UserWithSkills>>, AppError> {
    let pattern = format!("%{}%", params.search.as_deref().unwrap_or("").trim());

    let users: Vec<UserWithSkills> = sqlx::query_as(
        r#"
        SELECT u.id, u.name, u.email, u.bio, u.profile_picture, u.is_admin, u.created_at,
               COALESCE(array_agg(s.name ORDER BY s.name) FILTER (WHERE s.name IS NOT NULL), '{}') AS skills
        FROM users u
        LEFT JOIN user_skills us ON us.user_id = u.id
        LEFT JOIN skills s ON s.id = us.skill_id
        WHERE u.name ILIKE $1 OR u.email ILIKE $1
        GROUP BY u.id
        ORDER BY u.created_at DESC
        "#,
    )
    .bind(&pattern)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(users))
}

/// GET /api/admin/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserWithSkills>, AppError> {
    let user = fetch_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// POST /api/admin/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let name = required_field(&request.name, "name").map_err(AppError::Validation)?;
    let email = required_field(&request.email, "email").map_err(AppError::Validation)?;
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
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
        INSERT INTO users (name, email, password_hash, is_admin)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .bind(request.is_admin)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub is_admin: Option<bool>,
    pub skills: Option<Vec<String>>,
}

/// PUT /api/admin/users/:id
///
/// Updates any provided fields; a provided password is rehashed, and a
/// provided skill list replaces the whole set. One transaction.
pub async fn handle_update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserWithSkills>, AppError> {
    if let Some(email) = request.email.as_deref() {
        if !is_valid_email(email) {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }
    }

    let password_hash = match request.password.as_deref() {
        Some(p) => Some(hash_password(p)?),
        None => None,
    };

    let mut tx = state.db.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE users
        SET name = COALESCE($1, name),
            email = COALESCE($2, email),
            bio = COALESCE($3, bio),
            is_admin = COALESCE($4, is_admin),
            password_hash = COALESCE($5, password_hash)
        WHERE id = $6
        "#,
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(&request.bio)
    .bind(request.is_admin)
    .bind(&password_hash)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if let Some(skills) = &request.skills {
        replace_user_skills(&mut tx, user_id, skills).await?;
    }

    tx.commit().await?;

    let user = fetch_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// DELETE /api/admin/users/:id
///
/// Admins cannot delete their own account.
pub async fn handle_delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if user_id == admin.id {
        return Err(AppError::Validation("Cannot delete own account".to_string()));
    }

    let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
