use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A platform user. The password hash is never serialized to clients.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A user row joined with the aggregated names of their skills.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserWithSkills {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub skills: Vec<String>,
}
