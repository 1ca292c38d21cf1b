//! Axum route handlers for the skill catalog.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::skill::SkillWithAssessmentCount;
use crate::pagination::{has_more, PageParams};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SkillListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SkillListResponse {
    pub skills: Vec<SkillWithAssessmentCount>,
    pub total: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
}

/// GET /api/skills
///
/// Paginated catalog with optional exact-category and name/description
/// search filters. `category=All` is the same as no category filter.
pub async fn handle_list_skills(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<SkillListQuery>,
) -> Result<Json<SkillListResponse>, AppError> {
    let page = PageParams {
        page: params.page,
        limit: params.limit,
    };
    let category = params
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != "All")
        .map(str::to_string);
    let search = params
        .search
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("%{}%", s.trim()));

    let skills: Vec<SkillWithAssessmentCount> = sqlx::query_as(
        r#"
        SELECT s.id, s.name, s.category, s.description, s.difficulty,
               COUNT(DISTINCT a.id) AS assessment_count
        FROM skills s
        LEFT JOIN assessments a ON a.skill_id = s.id
        WHERE ($1::text IS NULL OR s.category = $1)
          AND ($2::text IS NULL OR s.name ILIKE $2 OR s.description ILIKE $2)
        GROUP BY s.id
        ORDER BY s.name
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(&category)
    .bind(&search)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM skills s
        WHERE ($1::text IS NULL OR s.category = $1)
          AND ($2::text IS NULL OR s.name ILIKE $2 OR s.description ILIKE $2)
        "#,
    )
    .bind(&category)
    .bind(&search)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(SkillListResponse {
        has_more: has_more(page.offset(), skills.len(), total),
        current_page: page.page(),
        total,
        skills,
    }))
}
