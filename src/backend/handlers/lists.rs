/**
 * List Handlers
 *
 * - `POST /api/lists` - create at the end of the board
 * - `PUT /api/lists/{id}` - rename
 * - `PUT /api/lists/{id}/move` - reposition by `position` or `index`
 * - `DELETE /api/lists/{id}` - archive
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::backend::error::BackendResult;
use crate::backend::handlers::JsonBody;
use crate::backend::middleware::{AuthUser, OriginConnection};
use crate::backend::mutations::lists::{self, ListPatch, MoveList, NewList};
use crate::backend::server::state::AppState;
use crate::shared::board::ListView;

pub async fn create_list(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    JsonBody(input): JsonBody<NewList>,
) -> BackendResult<(StatusCode, Json<ListView>)> {
    let applied = lists::create_list(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(state.commit(applied, origin))))
}

pub async fn update_list(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(list_id): Path<Uuid>,
    JsonBody(patch): JsonBody<ListPatch>,
) -> BackendResult<Json<ListView>> {
    let applied = lists::update_list(state.store.as_ref(), list_id, patch).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn move_list(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(list_id): Path<Uuid>,
    JsonBody(input): JsonBody<MoveList>,
) -> BackendResult<Json<ListView>> {
    let applied = lists::move_list(state.store.as_ref(), list_id, input).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn archive_list(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(list_id): Path<Uuid>,
) -> BackendResult<Json<ListView>> {
    let applied = lists::archive_list(state.store.as_ref(), list_id).await?;
    Ok(Json(state.commit(applied, origin)))
}
