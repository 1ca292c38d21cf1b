//! Leaderboards: overall, per-assessment, and the caller's own ranking.
//! Read-only aggregation over `assessment_reports`.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

const LEADERBOARD_SIZE: i64 = 100;

#[derive(Debug, Clone, FromRow)]
struct ScoreRow {
    id: Uuid,
    username: String,
    avatar: Option<String>,
    score: f64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
    pub score: f64,
    pub rank: i64,
}

#[derive(Debug, Serialize)]
pub struct AssessmentLeaderboard {
    #[serde(rename = "assessmentId")]
    pub assessment_id: Uuid,
    #[serde(rename = "assessmentTitle")]
    pub assessment_title: String,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct UserRankingResponse {
    #[serde(rename = "totalScore")]
    pub total_score: f64,
    #[serde(rename = "globalRank")]
    pub global_rank: Option<i64>,
    #[serde(rename = "skillsMastered")]
    pub skills_mastered: i64,
}

/// Competition ranking over scores already sorted descending: equal scores
/// share a rank, and the rank after a tie skips.
fn competition_ranks(scores: &[f64]) -> Vec<i64> {
    let mut ranks = Vec::with_capacity(scores.len());
    for (i, score) in scores.iter().enumerate() {
        if i > 0 && *score == scores[i - 1] {
            ranks.push(ranks[i - 1]);
        } else {
            ranks.push(i as i64 + 1);
        }
    }
    ranks
}

fn with_ranks(rows: Vec<ScoreRow>) -> Vec<LeaderboardEntry> {
    let scores: Vec<f64> = rows.iter().map(|r| r.score).collect();
    let ranks = competition_ranks(&scores);
    rows.into_iter()
        .zip(ranks)
        .map(|(row, rank)| LeaderboardEntry {
            id: row.id,
            username: row.username,
            avatar: row.avatar,
            score: row.score,
            rank,
        })
        .collect()
}

/// GET /api/leaderboard/overall
///
/// Top users by summed report score across all assessments.
pub async fn handle_overall_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let rows: Vec<ScoreRow> = sqlx::query_as(
        r#"
        SELECT u.id, u.name AS username, u.profile_picture AS avatar,
               COALESCE(SUM(ar.score), 0) AS score
        FROM users u
        LEFT JOIN assessment_reports ar ON u.id = ar.user_id
        GROUP BY u.id, u.name, u.profile_picture
        ORDER BY score DESC, u.name
        LIMIT $1
        "#,
    )
    .bind(LEADERBOARD_SIZE)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(with_ranks(rows)))
}

/// GET /api/leaderboard/assessments
///
/// A top list per assessment that has at least one report.
pub async fn handle_assessment_leaderboards(
    State(state): State<AppState>,
) -> Result<Json<Vec<AssessmentLeaderboard>>, AppError> {
    let assessments: Vec<(Uuid, String)> = sqlx::query_as(
        r#"
        SELECT DISTINCT a.id, a.title
        FROM assessments a
        JOIN assessment_reports ar ON ar.assessment_id = a.id
        ORDER BY a.title
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let mut boards = Vec::with_capacity(assessments.len());
    for (assessment_id, assessment_title) in assessments {
        let rows: Vec<ScoreRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.name AS username, u.profile_picture AS avatar, ar.score
            FROM assessment_reports ar
            JOIN users u ON u.id = ar.user_id
            WHERE ar.assessment_id = $1
            ORDER BY ar.score DESC, u.name
            LIMIT $2
            "#,
        )
        .bind(assessment_id)
        .bind(LEADERBOARD_SIZE)
        .fetch_all(&state.db)
        .await?;

        boards.push(AssessmentLeaderboard {
            assessment_id,
            assessment_title,
            leaderboard: with_ranks(rows),
        });
    }

    Ok(Json(boards))
}

/// GET /api/leaderboard/me
///
/// The caller's summed score, global rank (window RANK over all users with
/// reports), and count of distinct assessments passed.
pub async fn handle_user_ranking(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserRankingResponse>, AppError> {
    let ranking: Option<(f64, i64)> = sqlx::query_as(
        r#"
        WITH user_scores AS (
            SELECT user_id,
                   COALESCE(SUM(score), 0) AS total_score,
                   RANK() OVER (ORDER BY COALESCE(SUM(score), 0) DESC) AS global_rank
            FROM assessment_reports
            GROUP BY user_id
        )
        SELECT total_score, global_rank
        FROM user_scores
        WHERE user_id = $1
        "#,
    )
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?;

    let skills_mastered: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT assessment_id) FROM assessment_reports WHERE user_id = $1 AND passed",
    )
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    let (total_score, global_rank) = match ranking {
        Some((total, rank)) => (total, Some(rank)),
        None => (0.0, None),
    };

    Ok(Json(UserRankingResponse {
        total_score,
        global_rank,
        skills_mastered,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_scores_rank_sequentially() {
        assert_eq!(competition_ranks(&[90.0, 80.0, 70.0]), vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_share_rank_and_next_skips() {
        assert_eq!(competition_ranks(&[90.0, 90.0, 80.0]), vec![1, 1, 3]);
    }

    #[test]
    fn test_all_tied() {
        assert_eq!(competition_ranks(&[50.0, 50.0, 50.0]), vec![1, 1, 1]);
    }

    #[test]
    fn test_tie_in_the_middle() {
        assert_eq!(
            competition_ranks(&[100.0, 80.0, 80.0, 80.0, 60.0]),
            vec![1, 2, 2, 2, 5]
        );
    }

    #[test]
    fn test_empty_scores() {
        assert!(competition_ranks(&[]).is_empty());
    }

    #[test]
    fn test_higher_score_never_ranks_worse() {
        let scores = [95.5, 95.5, 80.0, 42.0, 42.0, 0.0];
        let ranks = competition_ranks(&scores);
        for i in 1..scores.len() {
            if scores[i] < scores[i - 1] {
                assert!(ranks[i] > ranks[i - 1]);
            } else {
                assert_eq!(ranks[i], ranks[i - 1]);
            }
        }
    }
}
