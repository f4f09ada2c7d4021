/**
 * Card Mutations
 *
 * Cards are created last in their list, moved within or across the lists
 * of one board, and archived instead of deleted. A cross-list move writes
 * the new parent and the new position in one update.
 *
 * Label and member attachment is idempotent: attaching twice leaves one
 * join row, detaching something not attached is not an error.
 */

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::mutations::reorder::{place, renumber_events, Placement, SiblingSet};
use crate::backend::mutations::{card_context, find_list, nullable, Applied};
use crate::backend::reader::hydrate_card;
use crate::backend::store::BoardStore;
use crate::shared::board::{timestamp, Card, CardView};
use crate::shared::error::{require, require_text};
use crate::shared::event::{BoardEvent, CardMove, CardRemoved};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub list_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub cover_color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub cover_color: Option<Option<String>>,
}

/// Target list (defaults to the current one) and either a verbatim
/// `position` or a target `index`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCard {
    pub list_id: Option<Uuid>,
    pub position: Option<f64>,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachLabel {
    pub label_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachMember {
    pub user_id: Option<Uuid>,
}

pub async fn create_card(store: &dyn BoardStore, input: NewCard) -> BackendResult<Applied<CardView>> {
    let title = require_text("title", input.title.as_deref())?;
    let list_id = require("listId", input.list_id)?;
    let list = find_list(store, list_id).await?;

    let set = SiblingSet::Cards { list_id };
    let placed = place(store, set, Placement::Last, None).await?;

    let now = timestamp();
    let card = Card {
        id: Uuid::new_v4(),
        list_id,
        title,
        description: input.description,
        position: placed.position,
        due_date: input.due_date,
        cover_color: input.cover_color,
        is_archived: false,
        created_at: now,
        updated_at: now,
    };
    store.insert_card(&card).await?;
    tracing::debug!("[Board] Created card {} in list {} at {}", card.id, list_id, card.position);

    let view = hydrate_card(store, card).await?;
    let mut applied =
        Applied::new(list.board_id, view.clone()).with_event(BoardEvent::CardCreated(view));
    if placed.renumbered {
        applied = applied.with_events(renumber_events(store, set).await?);
    }
    Ok(applied)
}

pub async fn update_card(
    store: &dyn BoardStore,
    card_id: Uuid,
    patch: CardPatch,
) -> BackendResult<Applied<CardView>> {
    let (mut card, list) = card_context(store, card_id).await?;
    if let Some(title) = patch.title {
        card.title = require_text("title", Some(title.as_str()))?;
    }
    if let Some(description) = patch.description {
        card.description = description;
    }
    if let Some(due_date) = patch.due_date {
        card.due_date = due_date;
    }
    if let Some(cover_color) = patch.cover_color {
        card.cover_color = cover_color;
    }
    card.updated_at = timestamp();
    store.update_card(&card).await?;
    tracing::debug!("[Board] Updated card {}", card_id);

    updated(store, list.board_id, card).await
}

/// Move a card to a position in the same or another list of its board.
///
/// Concurrent moves of one card are last-write-wins; nothing here
/// serializes them.
pub async fn move_card(
    store: &dyn BoardStore,
    card_id: Uuid,
    input: MoveCard,
) -> BackendResult<Applied<CardView>> {
    let placement = Placement::from_request(input.position, input.index)?;
    let (mut card, from_list) = card_context(store, card_id).await?;

    let target_id = input.list_id.unwrap_or(from_list.id);
    let target = if target_id == from_list.id {
        from_list.clone()
    } else {
        find_list(store, target_id).await?
    };
    if target.board_id != from_list.board_id {
        return Err(BackendError::validation(
            "listId",
            "cards can only move between lists of the same board",
        ));
    }

    let set = SiblingSet::Cards { list_id: target.id };
    let placed = place(store, set, placement, Some(card_id)).await?;

    card.list_id = target.id;
    card.position = placed.position;
    card.updated_at = timestamp();
    store.update_card(&card).await?;
    tracing::debug!(
        "[Board] Moved card {} from list {} to list {} at {}",
        card_id,
        from_list.id,
        target.id,
        placed.position
    );

    let view = hydrate_card(store, card).await?;
    let moved = BoardEvent::CardMoved(CardMove {
        from_list_id: from_list.id,
        list_id: target.id,
        position: placed.position,
        card: view.clone(),
    });
    let mut applied = Applied::new(target.board_id, view)
        .with_event(moved)
        .with_repair(placed.needs_repair.then_some(set));
    if placed.renumbered {
        applied = applied.with_events(renumber_events(store, set).await?);
    }
    Ok(applied)
}

/// Soft delete. Returns the archived card.
pub async fn archive_card(store: &dyn BoardStore, card_id: Uuid) -> BackendResult<Applied<CardView>> {
    let (mut card, list) = card_context(store, card_id).await?;
    card.is_archived = true;
    card.updated_at = timestamp();
    store.update_card(&card).await?;
    tracing::debug!("[Board] Archived card {}", card_id);

    let view = hydrate_card(store, card).await?;
    Ok(Applied::new(list.board_id, view).with_event(BoardEvent::CardDeleted(CardRemoved {
        card_id,
        list_id: list.id,
    })))
}

pub async fn add_label(
    store: &dyn BoardStore,
    card_id: Uuid,
    input: AttachLabel,
) -> BackendResult<Applied<CardView>> {
    let label_id = require("labelId", input.label_id)?;
    let (card, list) = card_context(store, card_id).await?;
    let label = store
        .get_label(label_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Label", label_id))?;
    if label.board_id != list.board_id {
        return Err(BackendError::validation(
            "labelId",
            "label belongs to another board",
        ));
    }
    store.add_card_label(card_id, label_id).await?;
    tracing::debug!("[Board] Attached label {} to card {}", label_id, card_id);

    updated(store, list.board_id, card).await
}

pub async fn remove_label(
    store: &dyn BoardStore,
    card_id: Uuid,
    label_id: Uuid,
) -> BackendResult<Applied<CardView>> {
    let (card, list) = card_context(store, card_id).await?;
    if store.remove_card_label(card_id, label_id).await? {
        tracing::debug!("[Board] Detached label {} from card {}", label_id, card_id);
    }
    updated(store, list.board_id, card).await
}

pub async fn add_member(
    store: &dyn BoardStore,
    card_id: Uuid,
    input: AttachMember,
) -> BackendResult<Applied<CardView>> {
    let user_id = require("userId", input.user_id)?;
    let (card, list) = card_context(store, card_id).await?;
    if store.get_user(user_id).await?.is_none() {
        return Err(BackendError::not_found("User", user_id));
    }
    store.add_card_member(card_id, user_id).await?;
    tracing::debug!("[Board] Added member {} to card {}", user_id, card_id);

    updated(store, list.board_id, card).await
}

pub async fn remove_member(
    store: &dyn BoardStore,
    card_id: Uuid,
    user_id: Uuid,
) -> BackendResult<Applied<CardView>> {
    let (card, list) = card_context(store, card_id).await?;
    if store.remove_card_member(card_id, user_id).await? {
        tracing::debug!("[Board] Removed member {} from card {}", user_id, card_id);
    }
    updated(store, list.board_id, card).await
}

async fn updated(store: &dyn BoardStore, board_id: Uuid, card: Card) -> BackendResult<Applied<CardView>> {
    let view = hydrate_card(store, card).await?;
    Ok(Applied::new(board_id, view.clone()).with_event(BoardEvent::CardUpdated(view)))
}
