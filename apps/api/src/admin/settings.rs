//! Key-value platform settings, upserted in one transaction.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::extract::AdminUser;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/admin/settings
pub async fn handle_get_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT setting_key, setting_value FROM system_settings")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(rows.into_iter().collect()))
}

/// PUT /api/admin/settings
///
/// Upserts each provided key in one transaction.
pub async fn handle_update_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(settings): Json<BTreeMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let mut tx = state.db.begin().await?;

    for (key, value) in &settings {
        sqlx::query(
            r#"
            INSERT INTO system_settings (setting_key, setting_value)
            VALUES ($1, $2)
            ON CONFLICT (setting_key) DO UPDATE SET setting_value = EXCLUDED.setting_value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Json(json!({ "message": "Settings updated successfully" })))
}
