//! Admin blog-post management. Image uploads are out of scope; posts carry
//! an optional `image_path` set by the client.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::extract::AdminUser;
use crate::errors::AppError;
use crate::models::blog::BlogPostRow;
use crate::state::AppState;
use crate::validate::required_field;

#[derive(Debug, Deserialize)]
pub struct BlogSearchQuery {
    pub search: Option<String>,
}

/// GET /api/admin/blog-posts?search=
pub async fn handle_list_posts(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<BlogSearchQuery>,
) -> Result<Json<Vec<BlogPostRow>>, AppError> {
    let pattern = format!("%{}%", params.search.as_deref().unwrap_or("").trim());

    let posts: Vec<BlogPostRow> = sqlx::query_as(
        r#"
        SELECT * FROM blog_posts
        WHERE title ILIKE $1 OR content ILIKE $1 OR author ILIKE $1 OR category ILIKE $1
        ORDER BY published_at DESC
        "#,
    )
    .bind(&pattern)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(posts))
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub category: String,
    pub read_time: String,
    #[serde(default)]
    pub featured: bool,
    pub image_path: Option<String>,
}

/// POST /api/admin/blog-posts
pub async fn handle_create_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<BlogPostRow>), AppError> {
    let title = required_field(&request.title, "title").map_err(AppError::Validation)?;
    let content = required_field(&request.content, "content").map_err(AppError::Validation)?;
    let author = required_field(&request.author, "author").map_err(AppError::Validation)?;

    let post: BlogPostRow = sqlx::query_as(
        r#"
        INSERT INTO blog_posts
            (title, content, excerpt, author, category, read_time, featured, image_path)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(&request.excerpt)
    .bind(author)
    .bind(&request.category)
    .bind(&request.read_time)
    .bind(request.featured)
    .bind(&request.image_path)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub read_time: Option<String>,
    pub featured: Option<bool>,
    pub image_path: Option<String>,
}

/// PUT /api/admin/blog-posts/:id
pub async fn handle_update_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(post_id): Path<Uuid>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<BlogPostRow>, AppError> {
    let post: Option<BlogPostRow> = sqlx::query_as(
        r#"
        UPDATE blog_posts
        SET title = COALESCE($1, title),
            content = COALESCE($2, content),
            excerpt = COALESCE($3, excerpt),
            author = COALESCE($4, author),
            category = COALESCE($5, category),
            read_time = COALESCE($6, read_time),
            featured = COALESCE($7, featured),
            image_path = COALESCE($8, image_path)
        WHERE id = $9
        RETURNING *
        "#,
    )
    .bind(&request.title)
    .bind(&request.content)
    .bind(&request.excerpt)
    .bind(&request.author)
    .bind(&request.category)
    .bind(&request.read_time)
    .bind(request.featured)
    .bind(&request.image_path)
    .bind(post_id)
    .fetch_optional(&state.db)
    .await?;

    post.map(Json)
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))
}

/// DELETE /api/admin/blog-posts/:id
pub async fn handle_delete_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let deleted = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(post_id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("Blog post not found".to_string()));
    }

    Ok(Json(json!({ "message": "Blog post deleted successfully" })))
}
