use axum::extract::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Claims};
use crate::database::manager::DatabaseManager;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/users/signup - Create an account and receive a bearer token
pub async fn signup(Json(payload): Json<CredentialsRequest>) -> ApiResult<Value> {
    let (email, password) = require_credentials(&payload)?;

    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Email is not valid"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = auth::hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Server Error")
    })?;

    let pool = DatabaseManager::pool().await?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
         RETURNING id, email, password_hash, created_at, updated_at",
    )
    .bind(email)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::conflict("Email already in use")
        } else {
            tracing::error!("Database error creating user: {}", e);
            ApiError::internal_server_error("Server Error")
        }
    })?;

    tracing::info!("New account registered: {}", user.email);
    let token = issue_token(&user)?;
    Ok(ApiResponse::created(
        json!({ "email": user.email, "token": token }),
    ))
}

/// POST /api/users/login - Verify credentials and receive a bearer token
pub async fn login(Json(payload): Json<CredentialsRequest>) -> ApiResult<Value> {
    let (email, password) = require_credentials(&payload)?;

    let pool = DatabaseManager::pool().await?;
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Database error fetching user: {}", e);
        ApiError::internal_server_error("Server Error")
    })?;

    // Same message for unknown email and wrong password
    let user = user.ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    let verified = auth::verify_password(password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification failed: {}", e);
        ApiError::internal_server_error("Server Error")
    })?;

    if !verified {
        return Err(ApiError::unauthorized("Incorrect email or password"));
    }

    let token = issue_token(&user)?;
    Ok(ApiResponse::success(
        json!({ "email": user.email, "token": token }),
    ))
}

fn require_credentials(payload: &CredentialsRequest) -> Result<(&str, &str), ApiError> {
    match (payload.email.as_deref(), payload.password.as_deref()) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(ApiError::bad_request("All fields must be filled")),
    }
}

fn issue_token(user: &User) -> Result<String, ApiError> {
    auth::generate_jwt(Claims::new(user.id, user.email.clone())).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Server Error")
    })
}

/// Minimal shape check: one '@', non-empty local part, dotted domain
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails() {
        assert!(is_valid_email("reader@example.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("reader"));
        assert!(!is_valid_email("reader@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("reader@example"));
        assert!(!is_valid_email("reader@.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn requires_both_credential_fields() {
        let missing_password = CredentialsRequest {
            email: Some("reader@example.com".to_string()),
            password: None,
        };
        assert!(require_credentials(&missing_password).is_err());

        let empty_email = CredentialsRequest {
            email: Some(String::new()),
            password: Some("long-enough".to_string()),
        };
        assert!(require_credentials(&empty_email).is_err());

        let complete = CredentialsRequest {
            email: Some("reader@example.com".to_string()),
            password: Some("long-enough".to_string()),
        };
        assert!(require_credentials(&complete).is_ok());
    }
}
