use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password::check_length;
use crate::auth::Role;
use crate::error::{ApiError, FieldErrors};

pub const MAX_USER_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    /// Lowercased, unique across users.
    pub email: String,
    pub name: String,
    /// Argon2id PHC string; never leaves the server.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn create(name: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }
}

/// The user as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Normalize name and email and enforce the account rules.
    pub fn validate(self) -> Result<Self, ApiError> {
        let name = self.name.trim().to_string();
        let email = normalize_email(&self.email);

        let mut errors = FieldErrors::new();
        if name.is_empty() {
            errors.insert("name".to_string(), "must not be empty".to_string());
        } else if name.chars().count() > MAX_USER_NAME_LEN {
            errors.insert(
                "name".to_string(),
                format!("must be at most {} characters", MAX_USER_NAME_LEN),
            );
        }
        if !is_plausible_email(&email) {
            errors.insert("email".to_string(), "must be a valid email address".to_string());
        }
        if let Err(problem) = check_length(&self.password) {
            errors.insert("password".to_string(), problem);
        }

        if !errors.is_empty() {
            return Err(ApiError::validation_error("Invalid registration", errors));
        }

        Ok(Self {
            name,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: PublicUser,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
