//! Account registration.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::info;

use super::{bad_json, AppState};
use crate::models::UserResponse;
use crate::{security, validation, ApiError, ApiResult, StorageError};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/v1/users", post(create))
}

/// Handle `POST /api/v1/users`.
///
/// Responds `201` with the stored account (never its password hash), `422` for
/// an invalid payload and `409` when the username or email is already taken.
async fn create(
    State((store, config)): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    // ---
    let Json(body) = payload.map_err(bad_json)?;

    let mut registration = validation::validate_user(body)?;
    let password = std::mem::take(&mut registration.password);
    let hashed = security::hash_password(password, config.bcrypt_cost)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = store
        .create_user(&registration.into_new_user(hashed))
        .await
        .map_err(|e| match e {
            StorageError::DuplicateKey { constraint } => {
                info!("Rejected duplicate registration ({:?})", constraint);
                ApiError::Conflict(duplicate_message(constraint.as_deref()))
            }
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Name the taken field from the violated unique constraint.
fn duplicate_message(constraint: Option<&str>) -> String {
    // ---
    match constraint {
        Some(name) if name.contains("email") => "email already exists".to_string(),
        Some(name) if name.contains("username") => "username already exists".to_string(),
        _ => "username or email already exists".to_string(),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_duplicate_message_names_field() {
        // ---
        assert_eq!(duplicate_message(Some("users_email_key")), "email already exists");
        assert_eq!(duplicate_message(Some("users_username_key")), "username already exists");
        assert_eq!(duplicate_message(None), "username or email already exists");
    }
}
