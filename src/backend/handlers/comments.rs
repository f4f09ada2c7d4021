/**
 * Comment Handlers
 *
 * The author is always the authenticated caller; edits and deletes by
 * anyone else answer 403.
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
use crate::backend::mutations::comments::{self, CommentPatch, NewComment};
use crate::backend::server::state::AppState;
use crate::shared::board::CommentView;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub card_id: Option<Uuid>,
}

/// `GET /api/comments?cardId=`, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<CommentQuery>,
) -> BackendResult<Json<Vec<CommentView>>> {
    let card_id = query
        .card_id
        .ok_or_else(|| BackendError::validation("cardId", "is required"))?;
    Ok(Json(comments::card_comments(state.store.as_ref(), card_id).await?))
}

pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    OriginConnection(origin): OriginConnection,
    JsonBody(input): JsonBody<NewComment>,
) -> BackendResult<(StatusCode, Json<CommentView>)> {
    let applied = comments::create_comment(state.store.as_ref(), user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(state.commit(applied, origin))))
}

pub async fn update_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(comment_id): Path<Uuid>,
    JsonBody(patch): JsonBody<CommentPatch>,
) -> BackendResult<Json<CommentView>> {
    let applied =
        comments::update_comment(state.store.as_ref(), user.user_id, comment_id, patch).await?;
    Ok(Json(state.commit(applied, origin)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    OriginConnection(origin): OriginConnection,
    Path(comment_id): Path<Uuid>,
) -> BackendResult<Json<CommentView>> {
    let applied = comments::delete_comment(state.store.as_ref(), user.user_id, comment_id).await?;
    Ok(Json(state.commit(applied, origin)))
}
