//! User accounts. The password hash never leaves this module's row type.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

// ---

/// Registration payload after per-field type checks.
#[derive(Default, Validate)]
pub struct UserCreate {
    // ---
    #[validate(
        required(message = "field required"),
        length(min = 3, max = 50, message = "username must be between 3 and 50 characters")
    )]
    pub username: Option<String>,

    #[validate(
        required(message = "field required"),
        email(message = "email must be a valid address"),
        length(max = 100, message = "email must be at most 100 characters")
    )]
    pub email: Option<String>,

    #[validate(length(max = 100, message = "fullName must be at most 100 characters"))]
    pub full_name: Option<String>,

    #[validate(
        required(message = "field required"),
        length(min = 6, max = 100, message = "password must be between 6 and 100 characters")
    )]
    pub password: Option<String>,
}

impl fmt::Debug for UserCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCreate")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

/// Validated registration; the password is still in plaintext here and is
/// only ever consumed by [`UserRegistration::into_new_user`].
pub struct UserRegistration {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
}

impl UserRegistration {
    pub fn into_new_user(self, hashed_password: String) -> NewUser {
        NewUser {
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            hashed_password,
            is_admin: false,
        }
    }
}

impl fmt::Debug for UserRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRegistration")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Account ready for the store.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub hashed_password: String,
    pub is_admin: bool,
}

/// Row of the `users` table.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("is_active", &self.is_active)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

/// Client-visible account. Has no password field under any name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
