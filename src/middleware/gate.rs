//! Route gates: an ordered list of capability checks run before a handler.
//!
//! The router attaches one gate per protected route group. Checks run in
//! order and the first denial ends the request; the handler never sees it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::auth::{authenticate, AuthUser};
use crate::auth::{Role, TokenKeys};
use crate::error::ApiError;
use crate::state::AppState;

/// One thing a caller must be able to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// A valid bearer token. Attaches `AuthUser` to the request on success.
    Authenticated,
    /// An identity, attached by an earlier check, holding at least this role.
    Role(Role),
}

/// Outcome of a single check.
#[derive(Debug)]
pub enum Decision {
    Allow,
    Deny(ApiError),
}

impl Capability {
    fn check(self, keys: &TokenKeys, request: &mut Request) -> Decision {
        match self {
            Capability::Authenticated => match authenticate(keys, request.headers()) {
                Ok(user) => {
                    request.extensions_mut().insert(user);
                    Decision::Allow
                }
                Err(err) => Decision::Deny(err),
            },
            Capability::Role(required) => match request.extensions().get::<AuthUser>() {
                Some(user) if user.role.satisfies(required) => Decision::Allow,
                Some(_) => Decision::Deny(ApiError::forbidden(match required {
                    Role::Admin => "Admin access required".to_string(),
                    other => format!("Role '{}' required", other),
                })),
                None => Decision::Deny(ApiError::unauthorized("Authentication required")),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Gate {
    checks: Vec<Capability>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a check; checks run in the order they were added.
    pub fn require(mut self, capability: Capability) -> Self {
        self.checks.push(capability);
        self
    }

    pub fn authenticated() -> Self {
        Self::new().require(Capability::Authenticated)
    }

    /// Credential verification, then the admin role check.
    pub fn admin() -> Self {
        Self::authenticated().require(Capability::Role(Role::Admin))
    }

    pub fn checks(&self) -> &[Capability] {
        &self.checks
    }

    /// Run every check in order, stopping at the first denial.
    pub fn evaluate(&self, keys: &TokenKeys, request: &mut Request) -> Decision {
        for capability in &self.checks {
            if let Decision::Deny(err) = capability.check(keys, request) {
                tracing::warn!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    check = ?capability,
                    reason = %err,
                    "Request denied"
                );
                return Decision::Deny(err);
            }
        }
        Decision::Allow
    }
}

/// Middleware entry point, attached with `from_fn_with_state((state, gate), enforce)`.
pub async fn enforce(
    State((state, gate)): State<(AppState, Gate)>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.evaluate(&state.tokens, &mut request) {
        Decision::Allow => next.run(request).await,
        Decision::Deny(err) => err.into_response(),
    }
}
