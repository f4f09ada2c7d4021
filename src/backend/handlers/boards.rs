/**
 * Board Handlers
 *
 * - `GET /api/boards?workspaceId=` - active boards, optionally of one workspace
 * - `POST /api/boards` - create in a workspace (seeds default labels)
 * - `GET /api/boards/{id}` - the full board aggregate
 * - `PUT /api/boards/{id}` - update name, description, background
 * - `DELETE /api/boards/{id}` - archive
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::BackendResult;
use crate::backend::handlers::JsonBody;
use crate::backend::middleware::{AuthUser, OriginConnection};
use crate::backend::mutations::boards::{self, BoardPatch, NewBoard};
use crate::backend::reader;
use crate::backend::server::state::AppState;
use crate::shared::board::{Board, BoardView};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardQuery {
    pub workspace_id: Option<Uuid>,
}

pub async fn list_boards(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<BoardQuery>,
) -> BackendResult<Json<Vec<Board>>> {
    Ok(Json(
        boards::list_boards(state.store.as_ref(), query.workspace_id).await?,
    ))
}

pub async fn get_board(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(board_id): Path<Uuid>,
) -> BackendResult<Json<BoardView>> {
    Ok(Json(reader::read_board(state.store.as_ref(), board_id).await?))
}

pub async fn create_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    OriginConnection(origin): OriginConnection,
    JsonBody(input): JsonBody<NewBoard>,
) -> BackendResult<(StatusCode, Json<BoardView>)> {
    let applied = boards::create_board(state.store.as_ref(), user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(state.commit(applied, origin))))
}

pub async fn update_board(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(board_id): Path<Uuid>,
    JsonBody(patch): JsonBody<BoardPatch>,
) -> BackendResult<Json<BoardView>> {
    let applied = boards::update_board(state.store.as_ref(), board_id, patch).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn archive_board(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(board_id): Path<Uuid>,
) -> BackendResult<Json<Board>> {
    let applied = boards::archive_board(state.store.as_ref(), board_id).await?;
    Ok(Json(state.commit(applied, origin)))
}
