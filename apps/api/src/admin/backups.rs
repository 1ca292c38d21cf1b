//! Database backups via `pg_dump`, stored under the configured backup
//! directory. Download and delete validate filenames against traversal.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::info;

use crate::auth::extract::AdminUser;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BackupFile {
    pub filename: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// A backup filename must be a bare `.sql` name: no separators, no
/// traversal, nothing but alphanumerics, dashes, underscores and dots.
pub fn is_safe_backup_filename(name: &str) -> bool {
    if !name.ends_with(".sql") || name.len() <= ".sql".len() {
        return false;
    }
    if name.contains("..") {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

fn checked_path(backup_dir: &str, filename: &str) -> Result<std::path::PathBuf, AppError> {
    if !is_safe_backup_filename(filename) {
        return Err(AppError::Validation("Invalid backup filename".to_string()));
    }
    Ok(std::path::Path::new(backup_dir).join(filename))
}

/// POST /api/admin/backup
///
/// Runs `pg_dump` against the configured database and records the backup
/// time in settings.
pub async fn handle_create_backup(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    let timestamp = Utc::now();
    let filename = format!("backup-{}.sql", timestamp.format("%Y-%m-%dT%H-%M-%S"));
    let path = std::path::Path::new(&state.config.backup_dir).join(&filename);

    tokio::fs::create_dir_all(&state.config.backup_dir)
        .await
        .map_err(|e| AppError::Backup(format!("cannot create backup directory: {e}")))?;

    let output = Command::new("pg_dump")
        .arg("--dbname")
        .arg(&state.config.database_url)
        .arg("--file")
        .arg(&path)
        .output()
        .await
        .map_err(|e| AppError::Backup(format!("failed to run pg_dump: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Backup(format!("pg_dump failed: {stderr}")));
    }

    let size = tokio::fs::metadata(&path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);

    sqlx::query(
        r#"
        INSERT INTO system_settings (setting_key, setting_value)
        VALUES ('last_backup', $1)
        ON CONFLICT (setting_key) DO UPDATE SET setting_value = EXCLUDED.setting_value
        "#,
    )
    .bind(timestamp.to_rfc3339())
    .execute(&state.db)
    .await?;

    info!("Created database backup {filename} ({size} bytes)");

    Ok(Json(json!({
        "message": "Backup created successfully",
        "filename": filename,
        "size": size,
        "timestamp": timestamp.to_rfc3339(),
    })))
}

/// GET /api/admin/backups
pub async fn handle_list_backups(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<BackupFile>>, AppError> {
    let mut backups = Vec::new();

    let mut entries = match tokio::fs::read_dir(&state.config.backup_dir).await {
        Ok(entries) => entries,
        // No directory yet means no backups yet
        Err(_) => return Ok(Json(backups)),
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(".sql") {
            continue;
        }
        if let Ok(metadata) = entry.metadata().await {
            let created_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            backups.push(BackupFile {
                filename: name,
                size: metadata.len(),
                created_at,
            });
        }
    }

    backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(backups))
}

/// GET /api/admin/backups/:filename
pub async fn handle_download_backup(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let path = checked_path(&state.config.backup_dir, &filename)?;

    let contents = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::NotFound("Backup file not found".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/sql".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        contents,
    ))
}

/// DELETE /api/admin/backups/:filename
pub async fn handle_delete_backup(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(filename): Path<String>,
) -> Result<Json<Value>, AppError> {
    let path = checked_path(&state.config.backup_dir, &filename)?;

    tokio::fs::remove_file(&path)
        .await
        .map_err(|_| AppError::NotFound("Backup file not found".to_string()))?;

    Ok(Json(json!({ "message": "Backup deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_generated_names() {
        assert!(is_safe_backup_filename("backup-2026-08-06T10-30-00.sql"));
    }

    #[test]
    fn test_rejects_wrong_extension() {
        assert!(!is_safe_backup_filename("backup.tar.gz"));
        assert!(!is_safe_backup_filename("backup"));
    }

    #[test]
    fn test_rejects_bare_extension() {
        assert!(!is_safe_backup_filename(".sql"));
    }

    #[test]
    fn test_rejects_traversal() {
        assert!(!is_safe_backup_filename("../secrets.sql"));
        assert!(!is_safe_backup_filename("..%2fsecrets.sql"));
    }

    #[test]
    fn test_rejects_separators() {
        assert!(!is_safe_backup_filename("nested/backup.sql"));
        assert!(!is_safe_backup_filename("nested\\backup.sql"));
    }
}
