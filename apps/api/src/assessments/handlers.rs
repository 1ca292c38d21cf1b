//! Axum route handlers for the public assessment catalog, the submission
//! flow, and per-user attempt history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::assessments::submission::{submit_assessment, SubmitRequest, SubmitResponse};
use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::assessment::{AssessmentRow, QuestionRow};
use crate::models::attempt::AttemptHistoryRow;
use crate::state::AppState;

/// GET /api/assessments
pub async fn handle_list_assessments(
    State(state): State<AppState>,
) -> Result<Json<Vec<AssessmentRow>>, AppError> {
    let assessments: Vec<AssessmentRow> =
        sqlx::query_as("SELECT * FROM assessments ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(assessments))
}

/// GET /api/assessments/:id/questions
pub async fn handle_get_questions(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<Vec<QuestionRow>>, AppError> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM assessments WHERE id = $1")
        .bind(assessment_id)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "Assessment {assessment_id} not found"
        )));
    }

    let questions: Vec<QuestionRow> =
        sqlx::query_as("SELECT * FROM questions WHERE assessment_id = $1 ORDER BY id")
            .bind(assessment_id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(questions))
}

/// POST /api/assessments/:id/submit
///
/// Records the attempt and generates its report in one transaction.
pub async fn handle_submit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(assessment_id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let response = submit_assessment(&state.db, user.id, assessment_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/assessments/history
///
/// The caller's completed attempts joined with assessment titles, newest first.
pub async fn handle_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<AttemptHistoryRow>>, AppError> {
    let history: Vec<AttemptHistoryRow> = sqlx::query_as(
        r#"
        SELECT ua.id, ua.user_id, ua.assessment_id, ua.score, ua.completed_at,
               a.title, a.category
        FROM user_assessments ua
        JOIN assessments a ON ua.assessment_id = a.id
        WHERE ua.user_id = $1
        ORDER BY ua.completed_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(history))
}
