//! Admin dashboard: status echo, analytics, platform statistics, and the
//! system health check.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::assessments::submission::PASS_THRESHOLD;
use crate::auth::extract::AdminUser;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// GET /api/admin/check-status
///
/// Reached only through the admin guard, so `isAdmin` is always true here;
/// the route exists for the client to probe its session.
pub async fn handle_check_status(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(admin.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "isAdmin": user.is_admin,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "profile_picture": user.profile_picture,
        }
    })))
}

#[derive(Debug, Serialize, FromRow)]
pub struct RecentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct SkillDistributionEntry {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    #[serde(rename = "totalUsers")]
    pub total_users: i64,
    #[serde(rename = "totalAssessments")]
    pub total_assessments: i64,
    #[serde(rename = "totalBlogPosts")]
    pub total_blog_posts: i64,
    #[serde(rename = "averageScore")]
    pub average_score: i64,
    #[serde(rename = "recentRegistrations")]
    pub recent_registrations: Vec<RecentUser>,
    #[serde(rename = "skillDistribution")]
    pub skill_distribution: Vec<SkillDistributionEntry>,
}

/// GET /api/admin/analytics
pub async fn handle_analytics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;
    let total_assessments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assessments")
        .fetch_one(&state.db)
        .await?;
    let total_blog_posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts")
        .fetch_one(&state.db)
        .await?;
    let average_score: Option<f64> = sqlx::query_scalar("SELECT AVG(score) FROM user_assessments")
        .fetch_one(&state.db)
        .await?;

    let recent_registrations: Vec<RecentUser> = sqlx::query_as(
        r#"
        SELECT id, name, email, profile_picture, created_at
        FROM users
        ORDER BY created_at DESC
        LIMIT 5
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let skill_distribution: Vec<SkillDistributionEntry> = sqlx::query_as(
        r#"
        SELECT s.name, COUNT(DISTINCT us.user_id) AS count
        FROM skills s
        JOIN user_skills us ON s.id = us.skill_id
        GROUP BY s.name
        ORDER BY count DESC
        LIMIT 5
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(AnalyticsResponse {
        total_users,
        total_assessments,
        total_blog_posts,
        average_score: average_score.unwrap_or(0.0).round() as i64,
        recent_registrations,
        skill_distribution,
    }))
}

#[derive(Debug, Serialize, FromRow)]
pub struct UserStats {
    pub total_users: i64,
    pub new_users_this_week: i64,
    pub new_users_this_month: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct AssessmentStats {
    pub total_assessments: i64,
    pub average_time: Option<f64>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct AttemptStats {
    pub total_attempts: i64,
    pub average_score: Option<f64>,
    pub pass_rate: Option<f64>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct BlogStats {
    pub total_posts: i64,
    pub posts_this_month: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyAttempts {
    pub month: String,
    pub attempts: i64,
    pub average_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub users: UserStats,
    pub assessments: AssessmentStats,
    pub attempts: AttemptStats,
    pub blog: BlogStats,
    pub monthly_data: Vec<MonthlyAttempts>,
}

/// GET /api/admin/statistics
pub async fn handle_statistics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<StatisticsResponse>, AppError> {
    let users: UserStats = sqlx::query_as(
        r#"
        SELECT COUNT(*) AS total_users,
               COUNT(*) FILTER (WHERE created_at >= now() - interval '7 days') AS new_users_this_week,
               COUNT(*) FILTER (WHERE created_at >= now() - interval '30 days') AS new_users_this_month
        FROM users
        "#,
    )
    .fetch_one(&state.db)
    .await?;

    let assessments: AssessmentStats = sqlx::query_as(
        r#"
        SELECT COUNT(*) AS total_assessments,
               AVG(time_limit_minutes::double precision) AS average_time
        FROM assessments
        "#,
    )
    .fetch_one(&state.db)
    .await?;

    let attempts: AttemptStats = sqlx::query_as(
        r#"
        SELECT COUNT(*) AS total_attempts,
               AVG(score) AS average_score,
               COUNT(*) FILTER (WHERE score >= $1)::double precision * 100.0
                   / NULLIF(COUNT(*), 0) AS pass_rate
        FROM user_assessments
        "#,
    )
    .bind(PASS_THRESHOLD)
    .fetch_one(&state.db)
    .await?;

    let blog: BlogStats = sqlx::query_as(
        r#"
        SELECT COUNT(*) AS total_posts,
               COUNT(*) FILTER (WHERE published_at >= now() - interval '30 days') AS posts_this_month
        FROM blog_posts
        "#,
    )
    .fetch_one(&state.db)
    .await?;

    let monthly_data: Vec<MonthlyAttempts> = sqlx::query_as(
        r#"
        SELECT to_char(completed_at, 'YYYY-MM') AS month,
               COUNT(*) AS attempts,
               AVG(score) AS average_score
        FROM user_assessments
        WHERE completed_at >= now() - interval '6 months'
        GROUP BY month
        ORDER BY month
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(StatisticsResponse {
        users,
        assessments,
        attempts,
        blog,
        monthly_data,
    }))
}

/// GET /api/admin/system-check
///
/// Lightweight liveness probes: database round-trip and backup-directory
/// writability.
pub async fn handle_system_check(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    let mut checks = Vec::new();

    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => checks.push(json!({ "name": "Database Connection", "status": "ok" })),
        Err(e) => checks.push(json!({
            "name": "Database Connection",
            "status": "error",
            "message": e.to_string(),
        })),
    }

    let probe = std::path::Path::new(&state.config.backup_dir).join(".system-check");
    let fs_status = async {
        tokio::fs::create_dir_all(&state.config.backup_dir).await?;
        tokio::fs::write(&probe, b"system check probe").await?;
        tokio::fs::remove_file(&probe).await
    }
    .await;
    match fs_status {
        Ok(()) => checks.push(json!({ "name": "Backup Directory", "status": "ok" })),
        Err(e) => checks.push(json!({
            "name": "Backup Directory",
            "status": "error",
            "message": e.to_string(),
        })),
    }

    Ok(Json(json!({
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": checks,
    })))
}
