//! Admin assessment management: CRUD over assessments and their questions.
//! Multi-statement writes run in one transaction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::assessments::submission::PASS_THRESHOLD;
use crate::auth::extract::AdminUser;
use crate::errors::AppError;
use crate::models::assessment::{AssessmentWithStats, QuestionRow};
use crate::state::AppState;
use crate::validate::required_field;

const STATS_SELECT: &str = r#"
    SELECT a.*,
           (SELECT COUNT(*) FROM questions q WHERE q.assessment_id = a.id) AS num_questions,
           (SELECT COUNT(*) FROM user_assessments ua WHERE ua.assessment_id = a.id) AS total_attempts,
           (SELECT AVG(ua.score) FROM user_assessments ua WHERE ua.assessment_id = a.id) AS average_score,
           (SELECT COUNT(*) FILTER (WHERE ua.score >= $1)::double precision * 100.0 / NULLIF(COUNT(*), 0)
            FROM user_assessments ua WHERE ua.assessment_id = a.id) AS pass_rate
    FROM assessments a
"#;

#[derive(Debug, Deserialize)]
pub struct AssessmentSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentDetailResponse {
    #[serde(flatten)]
    pub assessment: AssessmentWithStats,
    pub questions: Vec<QuestionRow>,
}

#[derive(Debug, Deserialize)]
pub struct NewQuestion {
    pub question_text: String,
    pub correct_answer: String,
    #[serde(default = "empty_options")]
    pub options: Value,
    pub question_type: Option<String>,
}

fn empty_options() -> Value {
    Value::Array(vec![])
}

#[derive(Debug, Deserialize)]
pub struct CreateAssessmentRequest {
    pub skill_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub time_limit_minutes: Option<i32>,
    pub attempts_allowed: Option<i32>,
    #[serde(default)]
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssessmentRequest {
    pub skill_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub attempts_allowed: Option<i32>,
    /// A non-empty list replaces all existing questions.
    pub questions: Option<Vec<NewQuestion>>,
}

async fn fetch_with_stats(
    pool: &PgPool,
    assessment_id: Uuid,
) -> Result<Option<AssessmentWithStats>, AppError> {
    Ok(
        sqlx::query_as(&format!("{STATS_SELECT} WHERE a.id = $2"))
            .bind(PASS_THRESHOLD)
            .bind(assessment_id)
            .fetch_optional(pool)
            .await?,
    )
}

async fn fetch_questions(pool: &PgPool, assessment_id: Uuid) -> Result<Vec<QuestionRow>, AppError> {
    Ok(
        sqlx::query_as("SELECT * FROM questions WHERE assessment_id = $1 ORDER BY id")
            .bind(assessment_id)
            .fetch_all(pool)
            .await?,
    )
}

async fn insert_questions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    assessment_id: Uuid,
    questions: &[NewQuestion],
) -> Result<(), AppError> {
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (assessment_id, question_text, correct_answer, options, question_type)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(assessment_id)
        .bind(&question.question_text)
        .bind(&question.correct_answer)
        .bind(&question.options)
        .bind(question.question_type.as_deref().unwrap_or("multiple-choice"))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// GET /api/admin/assessments?search=
pub async fn handle_list_assessments(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<AssessmentSearchQuery>,
) -> Result<Json<Vec<AssessmentWithStats>>, AppError> {
    let pattern = format!("%{}%", params.search.as_deref().unwrap_or("").trim());

    let assessments: Vec<AssessmentWithStats> = sqlx::query_as(&format!(
        "{STATS_SELECT} WHERE a.title ILIKE $2 OR a.description ILIKE $2 ORDER BY a.created_at DESC"
    ))
    .bind(PASS_THRESHOLD)
    .bind(&pattern)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(assessments))
}

/// GET /api/admin/assessments/:id
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<AssessmentDetailResponse>, AppError> {
    let assessment = fetch_with_stats(&state.db, assessment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;
    let questions = fetch_questions(&state.db, assessment_id).await?;
    Ok(Json(AssessmentDetailResponse {
        assessment,
        questions,
    }))
}

/// POST /api/admin/assessments
///
/// Inserts the assessment and any provided questions in one transaction.
pub async fn handle_create_assessment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentDetailResponse>), AppError> {
    let title = required_field(&request.title, "title").map_err(AppError::Validation)?;
    let description =
        required_field(&request.description, "description").map_err(AppError::Validation)?;
    let category = required_field(&request.category, "category").map_err(AppError::Validation)?;
    let level = required_field(&request.level, "level").map_err(AppError::Validation)?;

    let mut tx = state.db.begin().await?;

    let assessment_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO assessments
            (skill_id, title, description, category, level, time_limit_minutes, attempts_allowed)
        VALUES ($1, $2, $3, $4, $5, COALESCE($6, 30), COALESCE($7, 3))
        RETURNING id
        "#,
    )
    .bind(request.skill_id)
    .bind(title)
    .bind(description)
    .bind(category)
    .bind(level)
    .bind(request.time_limit_minutes)
    .bind(request.attempts_allowed)
    .fetch_one(&mut *tx)
    .await?;

    insert_questions(&mut tx, assessment_id, &request.questions).await?;

    tx.commit().await?;

    tracing::info!("Created assessment {assessment_id} with {} questions", request.questions.len());

    let assessment = fetch_with_stats(&state.db, assessment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;
    let questions = fetch_questions(&state.db, assessment_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(AssessmentDetailResponse {
            assessment,
            questions,
        }),
    ))
}

/// PUT /api/admin/assessments/:id
///
/// Updates any provided fields; a non-empty question list replaces the
/// existing questions wholesale. One transaction.
pub async fn handle_update_assessment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(assessment_id): Path<Uuid>,
    Json(request): Json<UpdateAssessmentRequest>,
) -> Result<Json<AssessmentDetailResponse>, AppError> {
    let mut tx = state.db.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE assessments
        SET skill_id = COALESCE($1, skill_id),
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            category = COALESCE($4, category),
            level = COALESCE($5, level),
            time_limit_minutes = COALESCE($6, time_limit_minutes),
            attempts_allowed = COALESCE($7, attempts_allowed)
        WHERE id = $8
        "#,
    )
    .bind(request.skill_id)
    .bind(&request.title)
    .bind(&request.description)
    .bind(&request.category)
    .bind(&request.level)
    .bind(request.time_limit_minutes)
    .bind(request.attempts_allowed)
    .bind(assessment_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("Assessment not found".to_string()));
    }

    if let Some(questions) = &request.questions {
        if !questions.is_empty() {
            sqlx::query("DELETE FROM questions WHERE assessment_id = $1")
                .bind(assessment_id)
                .execute(&mut *tx)
                .await?;
            insert_questions(&mut tx, assessment_id, questions).await?;
        }
    }

    tx.commit().await?;

    let assessment = fetch_with_stats(&state.db, assessment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;
    let questions = fetch_questions(&state.db, assessment_id).await?;
    Ok(Json(AssessmentDetailResponse {
        assessment,
        questions,
    }))
}

/// DELETE /api/admin/assessments/:id
pub async fn handle_delete_assessment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM questions WHERE assessment_id = $1")
        .bind(assessment_id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM assessments WHERE id = $1")
        .bind(assessment_id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("Assessment not found".to_string()));
    }

    tx.commit().await?;

    Ok(Json(json!({ "message": "Assessment deleted successfully" })))
}

/// POST /api/admin/assessments/:id/questions
pub async fn handle_add_question(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(assessment_id): Path<Uuid>,
    Json(question): Json<NewQuestion>,
) -> Result<(StatusCode, Json<QuestionRow>), AppError> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM assessments WHERE id = $1")
        .bind(assessment_id)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Assessment not found".to_string()));
    }

    let row: QuestionRow = sqlx::query_as(
        r#"
        INSERT INTO questions (assessment_id, question_text, correct_answer, options, question_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(assessment_id)
    .bind(&question.question_text)
    .bind(&question.correct_answer)
    .bind(&question.options)
    .bind(question.question_type.as_deref().unwrap_or("multiple-choice"))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}
