/**
 * Checklist Handlers
 *
 * Checklists and their items. Deletes are hard deletes and return the
 * removed row.
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
use crate::backend::mutations::checklists::{
    self, ChecklistPatch, ItemPatch, NewChecklist, NewItem,
};
use crate::backend::server::state::AppState;
use crate::shared::board::{ChecklistItem, ChecklistView};

pub async fn create_checklist(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    JsonBody(input): JsonBody<NewChecklist>,
) -> BackendResult<(StatusCode, Json<ChecklistView>)> {
    let applied = checklists::create_checklist(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(state.commit(applied, origin))))
}

pub async fn update_checklist(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(checklist_id): Path<Uuid>,
    JsonBody(patch): JsonBody<ChecklistPatch>,
) -> BackendResult<Json<ChecklistView>> {
    let applied = checklists::update_checklist(state.store.as_ref(), checklist_id, patch).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn delete_checklist(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(checklist_id): Path<Uuid>,
) -> BackendResult<Json<ChecklistView>> {
    let applied = checklists::delete_checklist(state.store.as_ref(), checklist_id).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn create_item(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    JsonBody(input): JsonBody<NewItem>,
) -> BackendResult<(StatusCode, Json<ChecklistItem>)> {
    let applied = checklists::create_item(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(state.commit(applied, origin))))
}

pub async fn update_item(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(item_id): Path<Uuid>,
    JsonBody(patch): JsonBody<ItemPatch>,
) -> BackendResult<Json<ChecklistItem>> {
    let applied = checklists::update_item(state.store.as_ref(), item_id, patch).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn toggle_item(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(item_id): Path<Uuid>,
) -> BackendResult<Json<ChecklistItem>> {
    let applied = checklists::toggle_item(state.store.as_ref(), item_id).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn delete_item(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(item_id): Path<Uuid>,
) -> BackendResult<Json<ChecklistItem>> {
    let applied = checklists::delete_item(state.store.as_ref(), item_id).await?;
    Ok(Json(state.commit(applied, origin)))
}
