use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub skill_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub time_limit_minutes: i32,
    pub attempts_allowed: i32,
    pub created_at: DateTime<Utc>,
}

/// `options` is a serialized list of answer choices, as stored in jsonb.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub question_text: String,
    pub correct_answer: String,
    pub options: Value,
    pub question_type: String,
}

/// An assessment joined with attempt statistics, for the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentWithStats {
    pub id: Uuid,
    pub skill_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub time_limit_minutes: i32,
    pub attempts_allowed: i32,
    pub created_at: DateTime<Utc>,
    pub num_questions: i64,
    pub total_attempts: i64,
    pub average_score: Option<f64>,
    pub pass_rate: Option<f64>,
}
