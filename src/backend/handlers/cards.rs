/**
 * Card Handlers
 *
 * - `POST /api/cards` - create at the end of a list
 * - `GET /api/cards/{id}` - the hydrated card
 * - `PUT /api/cards/{id}` - edit fields
 * - `PUT /api/cards/{id}/move` - move within or across lists
 * - `DELETE /api/cards/{id}` - archive
 * - `POST /api/cards/{id}/labels`, `DELETE /api/cards/{id}/labels/{label_id}`
 * - `POST /api/cards/{id}/members`, `DELETE /api/cards/{id}/members/{user_id}`
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
use crate::backend::mutations::cards::{self, AttachLabel, AttachMember, CardPatch, MoveCard, NewCard};
use crate::backend::reader;
use crate::backend::server::state::AppState;
use crate::shared::board::CardView;

pub async fn create_card(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    JsonBody(input): JsonBody<NewCard>,
) -> BackendResult<(StatusCode, Json<CardView>)> {
    let applied = cards::create_card(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(state.commit(applied, origin))))
}

pub async fn get_card(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(card_id): Path<Uuid>,
) -> BackendResult<Json<CardView>> {
    Ok(Json(reader::load_card(state.store.as_ref(), card_id).await?))
}

pub async fn update_card(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(card_id): Path<Uuid>,
    JsonBody(patch): JsonBody<CardPatch>,
) -> BackendResult<Json<CardView>> {
    let applied = cards::update_card(state.store.as_ref(), card_id, patch).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn move_card(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(card_id): Path<Uuid>,
    JsonBody(input): JsonBody<MoveCard>,
) -> BackendResult<Json<CardView>> {
    let applied = cards::move_card(state.store.as_ref(), card_id, input).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn archive_card(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(card_id): Path<Uuid>,
) -> BackendResult<Json<CardView>> {
    let applied = cards::archive_card(state.store.as_ref(), card_id).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn add_label(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(card_id): Path<Uuid>,
    JsonBody(input): JsonBody<AttachLabel>,
) -> BackendResult<Json<CardView>> {
    let applied = cards::add_label(state.store.as_ref(), card_id, input).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn remove_label(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path((card_id, label_id)): Path<(Uuid, Uuid)>,
) -> BackendResult<Json<CardView>> {
    let applied = cards::remove_label(state.store.as_ref(), card_id, label_id).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn add_member(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(card_id): Path<Uuid>,
    JsonBody(input): JsonBody<AttachMember>,
) -> BackendResult<Json<CardView>> {
    let applied = cards::add_member(state.store.as_ref(), card_id, input).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn remove_member(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path((card_id, user_id)): Path<(Uuid, Uuid)>,
) -> BackendResult<Json<CardView>> {
    let applied = cards::remove_member(state.store.as_ref(), card_id, user_id).await?;
    Ok(Json(state.commit(applied, origin)))
}
