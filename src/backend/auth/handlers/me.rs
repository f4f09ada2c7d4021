/**
 * Get Current User Handler
 *
 * GET /api/auth/me returns the member record behind the bearer token.
 * Runs behind `auth_middleware`, so the user has already been resolved.
 */

use axum::{extract::State, response::Json};

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::board::Member;

pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> BackendResult<Json<Member>> {
    let member = state
        .store
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthenticated("unknown user"))?;
    Ok(Json(member))
}
