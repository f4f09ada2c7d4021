/**
 * Comment Mutations
 *
 * Only a comment's author may edit or delete it. Deletion is a hard
 * delete. Comment edits have no event of their own; peers receive the
 * whole card again.
 */

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::mutations::{card_context, Applied};
use crate::backend::reader::{hydrate_comment, hydrate_comments, load_card};
use crate::backend::store::BoardStore;
use crate::shared::board::{timestamp, Comment, CommentView};
use crate::shared::error::{require, require_text};
use crate::shared::event::{BoardEvent, CommentRemoved};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub card_id: Option<Uuid>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPatch {
    pub text: Option<String>,
}

async fn find_comment(store: &dyn BoardStore, comment_id: Uuid) -> BackendResult<Comment> {
    store
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Comment", comment_id))
}

fn ensure_author(comment: &Comment, user_id: Uuid) -> BackendResult<()> {
    if comment.author_id == user_id {
        Ok(())
    } else {
        Err(BackendError::forbidden(
            "only the author may change this comment",
        ))
    }
}

/// Comments on a card, newest first
pub async fn card_comments(store: &dyn BoardStore, card_id: Uuid) -> BackendResult<Vec<CommentView>> {
    card_context(store, card_id).await?;
    hydrate_comments(store, store.comments_for_card(card_id).await?).await
}

pub async fn create_comment(
    store: &dyn BoardStore,
    author_id: Uuid,
    input: NewComment,
) -> BackendResult<Applied<CommentView>> {
    let text = require_text("text", input.text.as_deref())?;
    let card_id = require("cardId", input.card_id)?;
    let (_, list) = card_context(store, card_id).await?;

    let now = timestamp();
    let comment = Comment {
        id: Uuid::new_v4(),
        card_id,
        author_id,
        text,
        created_at: now,
        updated_at: now,
    };
    store.insert_comment(&comment).await?;
    tracing::debug!("[Board] Created comment {} on card {}", comment.id, card_id);

    let view = hydrate_comment(store, comment).await?;
    Ok(Applied::new(list.board_id, view.clone()).with_event(BoardEvent::CommentCreated(view)))
}

pub async fn update_comment(
    store: &dyn BoardStore,
    user_id: Uuid,
    comment_id: Uuid,
    patch: CommentPatch,
) -> BackendResult<Applied<CommentView>> {
    let mut comment = find_comment(store, comment_id).await?;
    ensure_author(&comment, user_id)?;
    let (_, list) = card_context(store, comment.card_id).await?;

    if let Some(text) = patch.text {
        comment.text = require_text("text", Some(text.as_str()))?;
    }
    comment.updated_at = timestamp();
    store.update_comment(&comment).await?;
    tracing::debug!("[Board] Updated comment {}", comment_id);

    let card = load_card(store, comment.card_id).await?;
    let view = hydrate_comment(store, comment).await?;
    Ok(Applied::new(list.board_id, view).with_event(BoardEvent::CardUpdated(card)))
}

/// Returns the comment as it was before deletion
pub async fn delete_comment(
    store: &dyn BoardStore,
    user_id: Uuid,
    comment_id: Uuid,
) -> BackendResult<Applied<CommentView>> {
    let comment = find_comment(store, comment_id).await?;
    ensure_author(&comment, user_id)?;
    let (_, list) = card_context(store, comment.card_id).await?;

    if !store.delete_comment(comment_id).await? {
        return Err(BackendError::not_found("Comment", comment_id));
    }
    tracing::debug!("[Board] Deleted comment {}", comment_id);

    let card_id = comment.card_id;
    let view = hydrate_comment(store, comment).await?;
    Ok(Applied::new(list.board_id, view).with_event(BoardEvent::CommentDeleted(CommentRemoved {
        comment_id,
        card_id,
    })))
}
