// handlers/users.rs - /api/users accounts and token acquisition

use axum::{extract::State, Json};

use crate::auth::password::{dummy_hash, hash_password, verify_password};
use crate::auth::Role;
use crate::database::models::user::{normalize_email, LoginRequest, LoginResponse, RegisterRequest};
use crate::database::models::{PublicUser, User};
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::middleware::AuthUser;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Argon2 is deliberately slow; keep it off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Password task failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })
}

/// POST /api/users/register - create a `user` account
pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let RegisterRequest { name, email, password } = body.validate()?;

    let password_hash = blocking(move || hash_password(&password)).await??;
    let user = state
        .users
        .insert(User::create(name, email, password_hash, Role::User))
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(Json(PublicUser::from(&user)))
}

/// POST /api/users/login - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = normalize_email(&body.email);
    let user = state.users.find_by_email(&email).await?;

    // Unknown emails verify against the dummy hash so both failures cost the same
    let password = body.password;
    let phc = user.as_ref().map(|u| u.password_hash.clone());
    let verified = blocking(move || match phc.as_deref() {
        Some(phc) => verify_password(&password, phc),
        None => verify_password(&password, dummy_hash()),
    })
    .await?;

    let user = match user {
        Some(user) if verified => user,
        Some(user) => {
            tracing::warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
        None => {
            tracing::warn!("Login failed: unknown email");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        expires_in: state.tokens.expires_in(),
        user: PublicUser::from(&user),
    }))
}

/// GET /api/users/me - the account behind the presented token
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .users
        .find(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(PublicUser::from(&user)))
}
