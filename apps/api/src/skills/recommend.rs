//! Skill recommendation: a ranking heuristic over the user's attempt
//! history.
//!
//! Skills whose assessments the user already attempted are excluded.
//! With history, candidates are skills in the user's engaged categories or
//! matching the difficulty of a below-threshold attempt, ordered by
//! (category match, popularity desc, average score asc). Without history,
//! the catalog is served in popularity order.

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::assessments::submission::PASS_THRESHOLD;
use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::skill::RecommendedSkillRow;
use crate::pagination::{has_more, PageParams};
use crate::state::AppState;

#[derive(Debug, Clone, FromRow)]
struct HistoryFacts {
    score: f64,
    category: String,
    difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub skills: Vec<RecommendedSkillRow>,
    pub total: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
}

/// Categories the user has engaged with, most recent first, deduplicated.
fn engaged_categories(history: &[HistoryFacts]) -> Vec<String> {
    let mut categories = Vec::new();
    for fact in history {
        if !categories.contains(&fact.category) {
            categories.push(fact.category.clone());
        }
    }
    categories
}

/// Difficulties of skills the user scored below the pass threshold on.
fn weak_difficulties(history: &[HistoryFacts]) -> Vec<String> {
    let mut difficulties = Vec::new();
    for fact in history {
        if fact.score < PASS_THRESHOLD {
            if let Some(d) = &fact.difficulty {
                if !difficulties.contains(d) {
                    difficulties.push(d.clone());
                }
            }
        }
    }
    difficulties
}

async fn fetch_history(pool: &PgPool, user_id: Uuid) -> Result<Vec<HistoryFacts>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT ua.score, a.category, s.difficulty
        FROM user_assessments ua
        JOIN assessments a ON ua.assessment_id = a.id
        LEFT JOIN skills s ON a.skill_id = s.id
        WHERE ua.user_id = $1
        ORDER BY ua.completed_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// GET /api/skills/recommended
pub async fn handle_recommended_skills(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<PageParams>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let history = fetch_history(&state.db, user.id).await?;

    let (skills, total) = if history.is_empty() {
        fetch_popular(&state.db, &page).await?
    } else {
        let categories = engaged_categories(&history);
        let difficulties = weak_difficulties(&history);
        fetch_ranked(&state.db, user.id, &categories, &difficulties, &page).await?
    };

    Ok(Json(RecommendationResponse {
        has_more: has_more(page.offset(), skills.len(), total),
        current_page: page.page(),
        total,
        skills,
    }))
}

/// Cold-start fallback: no history yet, so serve the catalog by popularity.
async fn fetch_popular(
    pool: &PgPool,
    page: &PageParams,
) -> Result<(Vec<RecommendedSkillRow>, i64), AppError> {
    let skills: Vec<RecommendedSkillRow> = sqlx::query_as(
        r#"
        SELECT s.id, s.name, s.category, s.description, s.difficulty,
               COUNT(DISTINCT ua.id) AS popularity,
               AVG(ua.score) AS avg_score
        FROM skills s
        LEFT JOIN assessments a ON a.skill_id = s.id
        LEFT JOIN user_assessments ua ON ua.assessment_id = a.id
        GROUP BY s.id
        ORDER BY popularity DESC, avg_score ASC NULLS LAST, s.name
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skills")
        .fetch_one(pool)
        .await?;

    Ok((skills, total))
}

async fn fetch_ranked(
    pool: &PgPool,
    user_id: Uuid,
    categories: &[String],
    difficulties: &[String],
    page: &PageParams,
) -> Result<(Vec<RecommendedSkillRow>, i64), AppError> {
    let skills: Vec<RecommendedSkillRow> = sqlx::query_as(
        r#"
        SELECT s.id, s.name, s.category, s.description, s.difficulty,
               COUNT(DISTINCT ua.id) AS popularity,
               AVG(ua.score) AS avg_score
        FROM skills s
        LEFT JOIN assessments a ON a.skill_id = s.id
        LEFT JOIN user_assessments ua ON ua.assessment_id = a.id
        WHERE s.id NOT IN (
            SELECT a2.skill_id
            FROM user_assessments ua2
            JOIN assessments a2 ON ua2.assessment_id = a2.id
            WHERE ua2.user_id = $1 AND a2.skill_id IS NOT NULL
        )
        AND (s.category = ANY($2) OR s.difficulty = ANY($3))
        GROUP BY s.id
        ORDER BY CASE WHEN s.category = ANY($2) THEN 1 ELSE 2 END,
                 popularity DESC,
                 avg_score ASC NULLS LAST
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(user_id)
    .bind(categories)
    .bind(difficulties)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM skills s
        WHERE s.id NOT IN (
            SELECT a2.skill_id
            FROM user_assessments ua2
            JOIN assessments a2 ON ua2.assessment_id = a2.id
            WHERE ua2.user_id = $1 AND a2.skill_id IS NOT NULL
        )
        AND (s.category = ANY($2) OR s.difficulty = ANY($3))
        "#,
    )
    .bind(user_id)
    .bind(categories)
    .bind(difficulties)
    .fetch_one(pool)
    .await?;

    Ok((skills, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(score: f64, category: &str, difficulty: Option<&str>) -> HistoryFacts {
        HistoryFacts {
            score,
            category: category.to_string(),
            difficulty: difficulty.map(str::to_string),
        }
    }

    #[test]
    fn test_engaged_categories_deduplicates_in_order() {
        let history = vec![
            fact(80.0, "Backend", Some("Intermediate")),
            fact(50.0, "Frontend", Some("Beginner")),
            fact(90.0, "Backend", Some("Advanced")),
        ];
        assert_eq!(engaged_categories(&history), vec!["Backend", "Frontend"]);
    }

    #[test]
    fn test_weak_difficulties_only_below_threshold() {
        let history = vec![
            fact(95.0, "Backend", Some("Advanced")),
            fact(40.0, "Backend", Some("Intermediate")),
            fact(69.9, "Frontend", Some("Beginner")),
        ];
        assert_eq!(weak_difficulties(&history), vec!["Intermediate", "Beginner"]);
    }

    #[test]
    fn test_exactly_threshold_is_not_weak() {
        let history = vec![fact(70.0, "Backend", Some("Intermediate"))];
        assert!(weak_difficulties(&history).is_empty());
    }

    #[test]
    fn test_weak_difficulties_skip_unlinked_skills() {
        let history = vec![fact(10.0, "Backend", None)];
        assert!(weak_difficulties(&history).is_empty());
    }
}
