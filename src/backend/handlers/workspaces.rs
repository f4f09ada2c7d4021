/**
 * Workspace Handlers
 *
 * Workspaces have no board channel, so these handlers return their value
 * without going through `AppState::commit`.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::backend::error::BackendResult;
use crate::backend::handlers::JsonBody;
use crate::backend::middleware::AuthUser;
use crate::backend::mutations::workspaces::{self, NewWorkspace, WorkspacePatch};
use crate::backend::server::state::AppState;
use crate::shared::board::{Workspace, WorkspaceView};

/// Workspaces the caller is a member of
pub async fn list_workspaces(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> BackendResult<Json<Vec<WorkspaceView>>> {
    Ok(Json(
        workspaces::list_workspaces(state.store.as_ref(), user.user_id).await?,
    ))
}

pub async fn get_workspace(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(workspace_id): Path<Uuid>,
) -> BackendResult<Json<WorkspaceView>> {
    Ok(Json(
        workspaces::get_workspace(state.store.as_ref(), workspace_id).await?,
    ))
}

pub async fn create_workspace(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(input): JsonBody<NewWorkspace>,
) -> BackendResult<(StatusCode, Json<WorkspaceView>)> {
    let view = workspaces::create_workspace(state.store.as_ref(), user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update_workspace(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(workspace_id): Path<Uuid>,
    JsonBody(patch): JsonBody<WorkspacePatch>,
) -> BackendResult<Json<WorkspaceView>> {
    Ok(Json(
        workspaces::update_workspace(state.store.as_ref(), workspace_id, patch).await?,
    ))
}

/// Owner only
pub async fn delete_workspace(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(workspace_id): Path<Uuid>,
) -> BackendResult<Json<Workspace>> {
    Ok(Json(
        workspaces::delete_workspace(state.store.as_ref(), user.user_id, workspace_id).await?,
    ))
}
