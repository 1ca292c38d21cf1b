//! Assessment submission: one attempt row plus exactly one derived report,
//! written in a single transaction.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::attempt::{AssessmentReportRow, UserAssessmentRow};

/// Percentage needed (inclusive) for an attempt to count as a pass.
pub const PASS_THRESHOLD: f64 = 70.0;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub raw_score: i32,
    pub total_questions: i32,
    pub time_taken_seconds: i32,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub attempt: UserAssessmentRow,
    pub report: AssessmentReportRow,
}

/// Converts a raw score over a question count into a 0–100 percentage.
pub fn percent_score(raw_score: i32, total_questions: i32) -> f64 {
    (f64::from(raw_score) / f64::from(total_questions) * 100.0).clamp(0.0, 100.0)
}

/// Pass boundary is inclusive: exactly 70% passes.
pub fn is_passing(percent: f64) -> bool {
    percent >= PASS_THRESHOLD
}

fn validate(request: &SubmitRequest) -> Result<(), AppError> {
    if request.total_questions <= 0 {
        return Err(AppError::Validation(
            "total_questions must be greater than zero".to_string(),
        ));
    }
    if request.raw_score < 0 || request.raw_score > request.total_questions {
        return Err(AppError::Validation(
            "raw_score must be between 0 and total_questions".to_string(),
        ));
    }
    if request.time_taken_seconds < 0 {
        return Err(AppError::Validation(
            "time_taken_seconds must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Records a completed attempt and generates its report.
///
/// Both inserts happen in one transaction so an attempt can never exist
/// without its report. Duplicate submissions for the same assessment are
/// accepted as separate attempts.
pub async fn submit_assessment(
    pool: &PgPool,
    user_id: Uuid,
    assessment_id: Uuid,
    request: SubmitRequest,
) -> Result<SubmitResponse, AppError> {
    validate(&request)?;

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM assessments WHERE id = $1")
        .bind(assessment_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "Assessment {assessment_id} not found"
        )));
    }

    let score = percent_score(request.raw_score, request.total_questions);
    let passed = is_passing(score);

    let mut tx = pool.begin().await?;

    let attempt: UserAssessmentRow = sqlx::query_as(
        r#"
        INSERT INTO user_assessments (user_id, assessment_id, score, raw_score, total_questions)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(assessment_id)
    .bind(score)
    .bind(request.raw_score)
    .bind(request.total_questions)
    .fetch_one(&mut *tx)
    .await?;

    let report: AssessmentReportRow = sqlx::query_as(
        r#"
        INSERT INTO assessment_reports
            (user_assessment_id, user_id, assessment_id, score, passed, time_taken_seconds)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(attempt.id)
    .bind(user_id)
    .bind(assessment_id)
    .bind(score)
    .bind(passed)
    .bind(request.time_taken_seconds)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "User {user_id} submitted assessment {assessment_id}: {:.1}% ({})",
        score,
        if passed { "Pass" } else { "Fail" }
    );

    Ok(SubmitResponse { attempt, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_score_basic() {
        assert_eq!(percent_score(8, 10), 80.0);
        assert_eq!(percent_score(0, 10), 0.0);
        assert_eq!(percent_score(10, 10), 100.0);
    }

    #[test]
    fn test_pass_boundary_is_inclusive_at_70() {
        assert!(is_passing(70.0));
        assert!(!is_passing(69.999));
        assert!(is_passing(70.001));
    }

    #[test]
    fn test_seven_of_ten_passes() {
        let score = percent_score(7, 10);
        assert_eq!(score, 70.0);
        assert!(is_passing(score));
    }

    #[test]
    fn test_two_of_three_fails() {
        // 66.67% < 70%
        assert!(!is_passing(percent_score(2, 3)));
    }

    #[test]
    fn test_validate_rejects_zero_total() {
        let r = SubmitRequest {
            raw_score: 0,
            total_questions: 0,
            time_taken_seconds: 10,
        };
        assert!(validate(&r).is_err());
    }

    #[test]
    fn test_validate_rejects_score_above_total() {
        let r = SubmitRequest {
            raw_score: 11,
            total_questions: 10,
            time_taken_seconds: 10,
        };
        assert!(validate(&r).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_score() {
        let r = SubmitRequest {
            raw_score: -1,
            total_questions: 10,
            time_taken_seconds: 10,
        };
        assert!(validate(&r).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_time() {
        let r = SubmitRequest {
            raw_score: 5,
            total_questions: 10,
            time_taken_seconds: -1,
        };
        assert!(validate(&r).is_err());
    }

    #[test]
    fn test_validate_accepts_full_marks() {
        let r = SubmitRequest {
            raw_score: 10,
            total_questions: 10,
            time_taken_seconds: 0,
        };
        assert!(validate(&r).is_ok());
    }
}
