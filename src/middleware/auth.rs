use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::auth::{Claims, Role, TokenKeys};
use crate::error::ApiError;

/// Authenticated user context extracted from the bearer token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Verify the request's bearer token and return the identity it carries.
pub fn authenticate(keys: &TokenKeys, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_bearer(headers).map_err(|msg| ApiError::unauthorized(msg))?;
    let claims = keys.verify(token)?;
    Ok(AuthUser::from(claims))
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}

/// Handlers behind an authenticating gate take the identity as an argument.
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
