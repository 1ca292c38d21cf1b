//! Axum route handlers for the public blog, newsletter signup, and the
//! contact form.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::blog::BlogPostRow;
use crate::state::AppState;
use crate::validate::{is_valid_email, required_field};

/// GET /api/blog-posts
pub async fn handle_list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPostRow>>, AppError> {
    let posts: Vec<BlogPostRow> =
        sqlx::query_as("SELECT * FROM blog_posts ORDER BY published_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(posts))
}

/// GET /api/blog-posts/featured
pub async fn handle_featured_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPostRow>>, AppError> {
    let posts: Vec<BlogPostRow> =
        sqlx::query_as("SELECT * FROM blog_posts WHERE featured ORDER BY published_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(posts))
}

/// GET /api/blog-posts/category/:category
pub async fn handle_posts_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<BlogPostRow>>, AppError> {
    let posts: Vec<BlogPostRow> = sqlx::query_as(
        "SELECT * FROM blog_posts WHERE category = $1 ORDER BY published_at DESC",
    )
    .bind(&category)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(posts))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// GET /api/blog-posts/search?query=
pub async fn handle_search_posts(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<BlogPostRow>>, AppError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Search query is required".to_string()))?;

    let pattern = format!("%{query}%");
    let posts: Vec<BlogPostRow> = sqlx::query_as(
        r#"
        SELECT * FROM blog_posts
        WHERE title ILIKE $1 OR excerpt ILIKE $1 OR author ILIKE $1 OR category ILIKE $1
        ORDER BY published_at DESC
        "#,
    )
    .bind(&pattern)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(posts))
}

/// GET /api/blog-posts/:id
pub async fn handle_get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<BlogPostRow>, AppError> {
    let post: Option<BlogPostRow> = sqlx::query_as("SELECT * FROM blog_posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&state.db)
        .await?;
    post.map(Json)
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// POST /api/newsletter/subscribe
///
/// New addresses are inserted; unsubscribed addresses are reactivated;
/// active duplicates get 409.
pub async fn handle_subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let email = request.email.trim();
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let existing: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, status FROM newsletter_subscribers WHERE email = $1")
            .bind(email)
            .fetch_optional(&state.db)
            .await?;

    match existing {
        Some((id, status)) if status == "unsubscribed" => {
            sqlx::query(
                "UPDATE newsletter_subscribers SET status = 'active', subscribed_at = now() WHERE id = $1",
            )
            .bind(id)
            .execute(&state.db)
            .await?;
            Ok((
                StatusCode::OK,
                Json(json!({ "message": "Successfully re-subscribed" })),
            ))
        }
        Some(_) => Err(AppError::Conflict("Already subscribed".to_string())),
        None => {
            sqlx::query("INSERT INTO newsletter_subscribers (email) VALUES ($1)")
                .bind(email)
                .execute(&state.db)
                .await?;
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "Successfully subscribed" })),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// POST /api/contact
pub async fn handle_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let name = required_field(&request.name, "name").map_err(AppError::Validation)?;
    let email = required_field(&request.email, "email").map_err(AppError::Validation)?;
    let message = required_field(&request.message, "message").map_err(AppError::Validation)?;
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    sqlx::query("INSERT INTO contact_messages (name, email, message) VALUES ($1, $2, $3)")
        .bind(name)
        .bind(email)
        .bind(message)
        .execute(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Message received" })),
    ))
}
