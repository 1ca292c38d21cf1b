//! Axum route handlers for the authenticated user's profile, including the
//! user↔skill set.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::user::UserWithSkills;
use crate::state::AppState;
use crate::validate::is_valid_email;

/// Default metadata for skills created implicitly through a profile edit.
const USER_SKILL_CATEGORY: &str = "General";
const USER_SKILL_DESCRIPTION: &str = "User added skill";
const USER_SKILL_DIFFICULTY: &str = "Intermediate";

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Replaces a user's whole skill set inside the caller's transaction.
/// Unknown skill names are created with default catalog metadata.
pub async fn replace_user_skills(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    skills: &[String],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM user_skills WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    for skill_name in skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let skill_id: Uuid = match sqlx::query_scalar("SELECT id FROM skills WHERE name = $1")
            .bind(skill_name)
            .fetch_optional(&mut **tx)
            .await?
        {
            Some(id) => id,
            None => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO skills (name, category, description, difficulty)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(skill_name)
                .bind(USER_SKILL_CATEGORY)
                .bind(USER_SKILL_DESCRIPTION)
                .bind(USER_SKILL_DIFFICULTY)
                .fetch_one(&mut **tx)
                .await?
            }
        };

        sqlx::query(
            "INSERT INTO user_skills (user_id, skill_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(skill_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn fetch_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<UserWithSkills>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT u.id, u.name, u.email, u.bio, u.profile_picture, u.is_admin, u.created_at,
               COALESCE(array_agg(s.name ORDER BY s.name) FILTER (WHERE s.name IS NOT NULL), '{}') AS skills
        FROM users u
        LEFT JOIN user_skills us ON us.user_id = u.id
        LEFT JOIN skills s ON s.id = us.skill_id
        WHERE u.id = $1
        GROUP BY u.id
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserWithSkills>, AppError> {
    let profile = fetch_profile(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(profile))
}

/// PUT /api/profile/update
///
/// Updates any provided fields and, if `skills` is present, replaces the
/// whole skill set. Skill names without a catalog entry are created with
/// default metadata. Everything runs in one transaction.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserWithSkills>, AppError> {
    if let Some(email) = request.email.as_deref() {
        if !is_valid_email(email) {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }
    }

    let mut tx = state.db.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE users
        SET name = COALESCE($1, name),
            email = COALESCE($2, email),
            bio = COALESCE($3, bio)
        WHERE id = $4
        "#,
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(&request.bio)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if let Some(skills) = &request.skills {
        replace_user_skills(&mut tx, user.id, skills).await?;
    }

    tx.commit().await?;

    let profile = fetch_profile(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(profile))
}
