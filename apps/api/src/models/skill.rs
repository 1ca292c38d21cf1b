use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A skill joined with the number of assessments attached to it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillWithAssessmentCount {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub difficulty: String,
    pub assessment_count: i64,
}

/// A recommendation candidate: skill plus attempt popularity and mean score.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecommendedSkillRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub difficulty: String,
    pub popularity: i64,
    pub avg_score: Option<f64>,
}
