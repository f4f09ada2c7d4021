/**
 * Realtime Control Handlers
 *
 * The upstream half of a realtime connection. The SSE stream only
 * carries server to client traffic, so a client drives its connection
 * with plain POSTs:
 *
 * - `POST /realtime/connections/{id}/join` `{boardId}`
 * - `POST /realtime/connections/{id}/leave` `{boardId}`
 * - `POST /realtime/connections/{id}/publish` with a board envelope
 *
 * Only the user that opened a connection may drive it.
 */

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendResult;
use crate::backend::handlers::JsonBody;
use crate::backend::middleware::AuthUser;
use crate::backend::mutations::active_board;
use crate::backend::realtime::hub::ConnectionId;
use crate::backend::server::state::AppState;
use crate::shared::error::require;
use crate::shared::event::{BoardEnvelope, Presence};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTarget {
    pub board_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Published {
    /// Subscribers whose queue accepted the event
    pub delivered: usize,
}

pub async fn join_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(connection_id): Path<ConnectionId>,
    JsonBody(target): JsonBody<BoardTarget>,
) -> BackendResult<Json<Presence>> {
    let board_id = require("boardId", target.board_id)?;
    active_board(state.store.as_ref(), board_id).await?;
    let presence = state.hub.join(connection_id, user.user_id, board_id)?;
    Ok(Json(presence))
}

pub async fn leave_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(connection_id): Path<ConnectionId>,
    JsonBody(target): JsonBody<BoardTarget>,
) -> BackendResult<Json<Presence>> {
    let board_id = require("boardId", target.board_id)?;
    let presence = state.hub.leave(connection_id, user.user_id, board_id)?;
    Ok(Json(presence))
}

/// Relay a client-built envelope to the board's other subscribers
pub async fn publish(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(connection_id): Path<ConnectionId>,
    JsonBody(envelope): JsonBody<BoardEnvelope>,
) -> BackendResult<Json<Published>> {
    let delivered = state.hub.publish_from(connection_id, user.user_id, envelope)?;
    Ok(Json(Published { delivered }))
}
