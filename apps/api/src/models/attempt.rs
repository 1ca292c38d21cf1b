use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One completed attempt. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAssessmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assessment_id: Uuid,
    pub score: f64,
    pub raw_score: i32,
    pub total_questions: i32,
    pub completed_at: DateTime<Utc>,
}

/// Derived summary written in the same transaction as its attempt.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentReportRow {
    pub id: Uuid,
    pub user_assessment_id: Uuid,
    pub user_id: Uuid,
    pub assessment_id: Uuid,
    pub score: f64,
    pub passed: bool,
    pub time_taken_seconds: i32,
    pub created_at: DateTime<Utc>,
}

/// History entry: an attempt joined with its assessment title.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptHistoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assessment_id: Uuid,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
    pub title: String,
    pub category: String,
}
