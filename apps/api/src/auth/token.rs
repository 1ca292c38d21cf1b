use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried in the bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues an HS256 token for the given user, expiring after `expiry_hours`.
pub fn issue_token(user_id: Uuid, email: &str, secret: &str, expiry_hours: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(expiry_hours)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Decodes and validates a bearer token, including its expiry.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "testsecret123";

    #[test]
    fn test_issue_then_verify_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "test@example.com", SECRET, 1).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "test@example.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(Uuid::new_v4(), "a@b.co", SECRET, 1).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token("invalidtoken", SECRET).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // exp in the past; jsonwebtoken's default leeway is 60s, so go well past it
        let token = issue_token(Uuid::new_v4(), "a@b.co", SECRET, -2).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }
}
