//! Request extractors for authenticated and admin access.
//!
//! `AuthUser` checks the bearer token only; `AdminUser` additionally loads
//! the `is_admin` flag from the database, so a revoked admin loses access
//! without waiting for token expiry.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::token::verify_token;
use crate::errors::AppError;
use crate::state::AppState;

/// The authenticated caller, extracted from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// An authenticated caller verified against the users table as an admin.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("No token, authorization denied".to_string()))?;
    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("No token, authorization denied".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = verify_token(token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Token is not valid".to_string()))?;
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let is_admin: Option<bool> = sqlx::query_scalar("SELECT is_admin FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_optional(&state.db)
            .await?;

        match is_admin {
            None => Err(AppError::NotFound("User not found".to_string())),
            Some(false) => Err(AppError::Forbidden(
                "Access denied. Admin privileges required.".to_string(),
            )),
            Some(true) => Ok(AdminUser {
                id: user.id,
                email: user.email,
            }),
        }
    }
}
