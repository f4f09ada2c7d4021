/**
 * Checklist Mutations
 *
 * Checklists and their items are hard-deleted. Deleting a checklist
 * deletes its items first.
 */

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::mutations::reorder::{place, renumber_events, Placement, SiblingSet};
use crate::backend::mutations::{card_context, checklist_context, item_context, Applied};
use crate::backend::reader::hydrate_checklist;
use crate::backend::store::BoardStore;
use crate::shared::board::{timestamp, Checklist, ChecklistItem, ChecklistView};
use crate::shared::error::{require, require_text};
use crate::shared::event::{BoardEvent, ChecklistItemChange, ChecklistItemRemoved, ChecklistRemoved};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChecklist {
    pub card_id: Option<Uuid>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistPatch {
    pub title: Option<String>,
    pub position: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub checklist_id: Option<Uuid>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
    pub position: Option<f64>,
}

pub async fn create_checklist(
    store: &dyn BoardStore,
    input: NewChecklist,
) -> BackendResult<Applied<ChecklistView>> {
    let title = require_text("title", input.title.as_deref())?;
    let card_id = require("cardId", input.card_id)?;
    let (_, list) = card_context(store, card_id).await?;

    let set = SiblingSet::Checklists { card_id };
    let placed = place(store, set, Placement::Last, None).await?;
    let checklist = Checklist {
        id: Uuid::new_v4(),
        card_id,
        title,
        position: placed.position,
        created_at: timestamp(),
    };
    store.insert_checklist(&checklist).await?;
    tracing::debug!("[Board] Created checklist {} on card {}", checklist.id, card_id);

    let view = hydrate_checklist(store, checklist).await?;
    let mut applied =
        Applied::new(list.board_id, view.clone()).with_event(BoardEvent::ChecklistCreated(view));
    if placed.renumbered {
        applied = applied.with_events(renumber_events(store, set).await?);
    }
    Ok(applied)
}

pub async fn update_checklist(
    store: &dyn BoardStore,
    checklist_id: Uuid,
    patch: ChecklistPatch,
) -> BackendResult<Applied<ChecklistView>> {
    let (mut checklist, board_id) = checklist_context(store, checklist_id).await?;
    let set = SiblingSet::Checklists {
        card_id: checklist.card_id,
    };

    if let Some(title) = patch.title {
        checklist.title = require_text("title", Some(title.as_str()))?;
    }
    let mut repair = None;
    if let Some(position) = patch.position {
        let placed = place(store, set, Placement::from_request(Some(position), None)?, Some(checklist_id)).await?;
        checklist.position = placed.position;
        repair = placed.needs_repair.then_some(set);
    }
    store.update_checklist(&checklist).await?;
    tracing::debug!("[Board] Updated checklist {}", checklist_id);

    let view = hydrate_checklist(store, checklist).await?;
    Ok(Applied::new(board_id, view.clone())
        .with_event(BoardEvent::ChecklistUpdated(view))
        .with_repair(repair))
}

/// Deletes the items, then the checklist. Returns the deleted checklist.
pub async fn delete_checklist(
    store: &dyn BoardStore,
    checklist_id: Uuid,
) -> BackendResult<Applied<ChecklistView>> {
    let (checklist, board_id) = checklist_context(store, checklist_id).await?;
    let card_id = checklist.card_id;
    let view = hydrate_checklist(store, checklist).await?;

    for item in &view.items {
        store.delete_checklist_item(item.id).await?;
    }
    if !store.delete_checklist(checklist_id).await? {
        return Err(BackendError::not_found("Checklist", checklist_id));
    }
    tracing::debug!(
        "[Board] Deleted checklist {} with {} items",
        checklist_id,
        view.items.len()
    );

    Ok(Applied::new(board_id, view).with_event(BoardEvent::ChecklistDeleted(ChecklistRemoved {
        checklist_id,
        card_id,
    })))
}

pub async fn create_item(store: &dyn BoardStore, input: NewItem) -> BackendResult<Applied<ChecklistItem>> {
    let title = require_text("title", input.title.as_deref())?;
    let checklist_id = require("checklistId", input.checklist_id)?;
    let (checklist, board_id) = checklist_context(store, checklist_id).await?;

    let set = SiblingSet::Items { checklist_id };
    let placed = place(store, set, Placement::Last, None).await?;
    let item = ChecklistItem {
        id: Uuid::new_v4(),
        checklist_id,
        title,
        position: placed.position,
        is_completed: false,
        created_at: timestamp(),
    };
    store.insert_checklist_item(&item).await?;
    tracing::debug!("[Board] Created checklist item {} in {}", item.id, checklist_id);

    let mut applied = Applied::new(board_id, item.clone()).with_event(BoardEvent::ChecklistItemCreated(
        ChecklistItemChange {
            card_id: checklist.card_id,
            item,
        },
    ));
    if placed.renumbered {
        applied = applied.with_events(renumber_events(store, set).await?);
    }
    Ok(applied)
}

pub async fn update_item(
    store: &dyn BoardStore,
    item_id: Uuid,
    patch: ItemPatch,
) -> BackendResult<Applied<ChecklistItem>> {
    let (mut item, checklist, board_id) = item_context(store, item_id).await?;
    let set = SiblingSet::Items {
        checklist_id: checklist.id,
    };

    if let Some(title) = patch.title {
        item.title = require_text("title", Some(title.as_str()))?;
    }
    if let Some(done) = patch.is_completed {
        item.is_completed = done;
    }
    let mut repair = None;
    if let Some(position) = patch.position {
        let placed = place(store, set, Placement::from_request(Some(position), None)?, Some(item_id)).await?;
        item.position = placed.position;
        repair = placed.needs_repair.then_some(set);
    }
    store.update_checklist_item(&item).await?;
    tracing::debug!("[Board] Updated checklist item {}", item_id);

    Ok(item_updated(board_id, checklist.card_id, item).with_repair(repair))
}

/// Flip completion
pub async fn toggle_item(store: &dyn BoardStore, item_id: Uuid) -> BackendResult<Applied<ChecklistItem>> {
    let (mut item, checklist, board_id) = item_context(store, item_id).await?;
    item.is_completed = !item.is_completed;
    store.update_checklist_item(&item).await?;
    tracing::debug!(
        "[Board] Toggled checklist item {} to {}",
        item_id,
        item.is_completed
    );
    Ok(item_updated(board_id, checklist.card_id, item))
}

/// Returns the item as it was before deletion
pub async fn delete_item(store: &dyn BoardStore, item_id: Uuid) -> BackendResult<Applied<ChecklistItem>> {
    let (item, checklist, board_id) = item_context(store, item_id).await?;
    if !store.delete_checklist_item(item_id).await? {
        return Err(BackendError::not_found("ChecklistItem", item_id));
    }
    tracing::debug!("[Board] Deleted checklist item {}", item_id);

    Ok(Applied::new(board_id, item).with_event(BoardEvent::ChecklistItemDeleted(
        ChecklistItemRemoved {
            item_id,
            checklist_id: checklist.id,
            card_id: checklist.card_id,
        },
    )))
}

fn item_updated(board_id: Uuid, card_id: Uuid, item: ChecklistItem) -> Applied<ChecklistItem> {
    Applied::new(board_id, item.clone())
        .with_event(BoardEvent::ChecklistItemUpdated(ChecklistItemChange { card_id, item }))
}
