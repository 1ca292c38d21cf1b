//! Admin management of newsletter subscribers and contact messages,
//! including the mailing-list CSV export.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::extract::AdminUser;
use crate::errors::AppError;
use crate::models::blog::{ContactMessageRow, SubscriberRow};
use crate::state::AppState;
use crate::validate::is_valid_email;

/// GET /api/admin/subscribers
pub async fn handle_list_subscribers(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<SubscriberRow>>, AppError> {
    let subscribers: Vec<SubscriberRow> =
        sqlx::query_as("SELECT * FROM newsletter_subscribers ORDER BY subscribed_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(subscribers))
}

#[derive(Debug, Deserialize)]
pub struct AddSubscriberRequest {
    pub email: String,
}

/// POST /api/admin/subscribers
pub async fn handle_add_subscriber(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<AddSubscriberRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let email = request.email.trim();
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM newsletter_subscribers WHERE email = $1")
            .bind(email)
            .fetch_optional(&state.db)
            .await?;
    if existing.is_some() {
        return Err(AppError::Validation("Email already subscribed".to_string()));
    }

    sqlx::query("INSERT INTO newsletter_subscribers (email) VALUES ($1)")
        .bind(email)
        .execute(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Subscriber added successfully" })),
    ))
}

/// DELETE /api/admin/subscribers/:id
pub async fn handle_delete_subscriber(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(subscriber_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let deleted = sqlx::query("DELETE FROM newsletter_subscribers WHERE id = $1")
        .bind(subscriber_id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("Subscriber not found".to_string()));
    }

    Ok(Json(json!({ "message": "Subscriber deleted successfully" })))
}

/// GET /api/admin/subscribers/export
///
/// The active mailing list as a CSV attachment, one address per line.
pub async fn handle_export_subscribers(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let emails: Vec<(String,)> =
        sqlx::query_as("SELECT email FROM newsletter_subscribers WHERE status = 'active' ORDER BY email")
            .fetch_all(&state.db)
            .await?;

    let body = emails
        .into_iter()
        .map(|(email,)| email)
        .collect::<Vec<_>>()
        .join("\n");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=subscribers.csv",
            ),
        ],
        body,
    ))
}

/// GET /api/admin/contact-messages
pub async fn handle_list_messages(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ContactMessageRow>>, AppError> {
    let messages: Vec<ContactMessageRow> =
        sqlx::query_as("SELECT * FROM contact_messages ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(messages))
}

/// DELETE /api/admin/contact-messages/:id
pub async fn handle_delete_message(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let deleted = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
        .bind(message_id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("Contact message not found".to_string()));
    }

    Ok(Json(json!({ "message": "Contact message deleted successfully" })))
}
