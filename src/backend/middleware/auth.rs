/**
 * Authentication Middleware
 *
 * Protects the API routes. The bearer token in the `Authorization`
 * header is verified, its user must exist in the store, and the result
 * is attached to the request extensions for `AuthUser` to pick up.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from the bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify a token and confirm its user still exists
pub async fn authenticate(state: &AppState, token: &str) -> BackendResult<AuthenticatedUser> {
    let user_id = state.tokens.user_id(token).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {}", e);
        BackendError::unauthenticated("invalid token")
    })?;

    let user = state.store.get_user(user_id).await?.ok_or_else(|| {
        tracing::warn!("[Auth] Token for unknown user {}", user_id);
        BackendError::unauthenticated("unknown user")
    })?;

    Ok(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
    })
}

/// Authentication middleware
///
/// Returns 401 if the token is missing, invalid, or names a user that
/// does not exist.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::warn!("[Auth] Missing Authorization header");
        BackendError::unauthenticated("missing bearer token")
    })?;

    let user = authenticate(&app_state, token).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Axum extractor for the user attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::unauthenticated("not authenticated")
            })
    }
}
