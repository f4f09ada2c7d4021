/**
 * Label Handlers
 *
 * Board-scoped labels. Label changes carry no board event.
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::handlers::JsonBody;
use crate::backend::middleware::{AuthUser, OriginConnection};
use crate::backend::mutations::labels::{self, LabelPatch, NewLabel};
use crate::backend::server::state::AppState;
use crate::shared::board::Label;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelQuery {
    pub board_id: Option<Uuid>,
}

/// `GET /api/labels?boardId=`
pub async fn list_labels(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<LabelQuery>,
) -> BackendResult<Json<Vec<Label>>> {
    let board_id = query
        .board_id
        .ok_or_else(|| BackendError::validation("boardId", "is required"))?;
    Ok(Json(labels::board_labels(state.store.as_ref(), board_id).await?))
}

pub async fn create_label(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    JsonBody(input): JsonBody<NewLabel>,
) -> BackendResult<(StatusCode, Json<Label>)> {
    let applied = labels::create_label(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(state.commit(applied, origin))))
}

pub async fn update_label(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(label_id): Path<Uuid>,
    JsonBody(patch): JsonBody<LabelPatch>,
) -> BackendResult<Json<Label>> {
    let applied = labels::update_label(state.store.as_ref(), label_id, patch).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn delete_label(
    State(state): State<AppState>,
    _user: AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(label_id): Path<Uuid>,
) -> BackendResult<Json<Label>> {
    let applied = labels::delete_label(state.store.as_ref(), label_id).await?;
    Ok(Json(state.commit(applied, origin)))
}
