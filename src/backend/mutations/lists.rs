/**
 * List Mutations
 *
 * Lists are created last among their board's active lists, reordered by
 * `move_list`, and archived instead of deleted. Archiving leaves the
 * remaining lists' positions alone.
 */

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::BackendResult;
use crate::backend::mutations::reorder::{place, renumber_events, Placement, SiblingSet};
use crate::backend::mutations::{active_board, find_list, Applied};
use crate::backend::reader::hydrate_list;
use crate::backend::store::BoardStore;
use crate::shared::board::{timestamp, List, ListView};
use crate::shared::error::{require, require_text};
use crate::shared::event::{BoardEvent, ListMove, ListRemoved};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewList {
    pub board_id: Option<Uuid>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatch {
    pub name: Option<String>,
}

/// Either a verbatim `position` or a target `index`; neither appends
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveList {
    pub position: Option<f64>,
    pub index: Option<usize>,
}

pub async fn create_list(store: &dyn BoardStore, input: NewList) -> BackendResult<Applied<ListView>> {
    let name = require_text("name", input.name.as_deref())?;
    let board_id = require("boardId", input.board_id)?;
    active_board(store, board_id).await?;

    let set = SiblingSet::Lists { board_id };
    let placed = place(store, set, Placement::Last, None).await?;

    let now = timestamp();
    let list = List {
        id: Uuid::new_v4(),
        board_id,
        name,
        position: placed.position,
        is_archived: false,
        created_at: now,
        updated_at: now,
    };
    store.insert_list(&list).await?;
    tracing::debug!("[Board] Created list {} at {}", list.id, list.position);

    let view = hydrate_list(store, list).await?;
    let mut applied = Applied::new(board_id, view.clone()).with_event(BoardEvent::ListCreated(view));
    if placed.renumbered {
        applied = applied.with_events(renumber_events(store, set).await?);
    }
    Ok(applied)
}

pub async fn update_list(
    store: &dyn BoardStore,
    list_id: Uuid,
    patch: ListPatch,
) -> BackendResult<Applied<ListView>> {
    let mut list = find_list(store, list_id).await?;
    if let Some(name) = patch.name {
        list.name = require_text("name", Some(name.as_str()))?;
    }
    list.updated_at = timestamp();
    store.update_list(&list).await?;
    tracing::debug!("[Board] Updated list {}", list_id);

    let board_id = list.board_id;
    let view = hydrate_list(store, list).await?;
    Ok(Applied::new(board_id, view.clone()).with_event(BoardEvent::ListUpdated(view)))
}

/// Reorder a list within its board. Only the moved list is written unless
/// the board's list positions have run out of precision.
pub async fn move_list(
    store: &dyn BoardStore,
    list_id: Uuid,
    input: MoveList,
) -> BackendResult<Applied<ListView>> {
    let placement = Placement::from_request(input.position, input.index)?;
    let mut list = find_list(store, list_id).await?;
    let set = SiblingSet::Lists {
        board_id: list.board_id,
    };
    let placed = place(store, set, placement, Some(list_id)).await?;

    list.position = placed.position;
    list.updated_at = timestamp();
    store.update_list(&list).await?;
    tracing::debug!("[Board] Moved list {} to {}", list_id, placed.position);

    let board_id = list.board_id;
    let view = hydrate_list(store, list).await?;
    let moved = BoardEvent::ListMoved(ListMove {
        position: placed.position,
        list: view.clone(),
    });
    let mut applied = Applied::new(board_id, view)
        .with_event(moved)
        .with_repair(placed.needs_repair.then_some(set));
    if placed.renumbered {
        applied = applied.with_events(renumber_events(store, set).await?);
    }
    Ok(applied)
}

/// Soft delete. Returns the archived list.
pub async fn archive_list(store: &dyn BoardStore, list_id: Uuid) -> BackendResult<Applied<ListView>> {
    let mut list = find_list(store, list_id).await?;
    list.is_archived = true;
    list.updated_at = timestamp();
    store.update_list(&list).await?;
    tracing::debug!("[Board] Archived list {}", list_id);

    let board_id = list.board_id;
    let view = hydrate_list(store, list).await?;
    Ok(Applied::new(board_id, view).with_event(BoardEvent::ListDeleted(ListRemoved { list_id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::error::BackendError;
    use crate::backend::mutations::fixtures::fixture;
    use crate::backend::reader::read_board;
    use crate::shared::GAP;
    use assert_matches::assert_matches;

    async fn new_list(store: &dyn BoardStore, board_id: Uuid, name: &str) -> ListView {
        create_list(
            store,
            NewList {
                board_id: Some(board_id),
                name: Some(name.to_string()),
            },
        )
        .await
        .unwrap()
        .value
    }

    #[tokio::test]
    async fn test_create_requires_name_and_board() {
        let f = fixture().await;
        assert_matches!(
            create_list(
                &f.store,
                NewList {
                    board_id: Some(f.board_id),
                    name: None
                }
            )
            .await,
            Err(BackendError::Validation { ref field, .. }) if field == "name"
        );
        assert_matches!(
            create_list(
                &f.store,
                NewList {
                    board_id: None,
                    name: Some("Todo".to_string())
                }
            )
            .await,
            Err(BackendError::Validation { ref field, .. }) if field == "boardId"
        );
        assert_matches!(
            create_list(
                &f.store,
                NewList {
                    board_id: Some(Uuid::new_v4()),
                    name: Some("Todo".to_string())
                }
            )
            .await,
            Err(BackendError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_created_lists_append() {
        let f = fixture().await;
        let a = new_list(&f.store, f.board_id, "a").await;
        let b = new_list(&f.store, f.board_id, "b").await;
        assert_eq!(a.list.position, GAP);
        assert_eq!(b.list.position, GAP * 2.0);
    }

    #[tokio::test]
    async fn test_move_to_head_by_index() {
        let f = fixture().await;
        let a = new_list(&f.store, f.board_id, "a").await;
        let b = new_list(&f.store, f.board_id, "b").await;
        let moved = move_list(
            &f.store,
            b.list.id,
            MoveList {
                position: None,
                index: Some(0),
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.value.list.position, GAP / 2.0);
        assert_matches!(moved.events.as_slice(), [BoardEvent::ListMoved(m)] if m.position == GAP / 2.0);

        let board = read_board(&f.store, f.board_id).await.unwrap();
        let order: Vec<_> = board.lists.iter().map(|l| l.list.id).collect();
        assert_eq!(order, vec![b.list.id, a.list.id]);
    }

    #[tokio::test]
    async fn test_archive_keeps_sibling_positions() {
        let f = fixture().await;
        let a = new_list(&f.store, f.board_id, "a").await;
        let b = new_list(&f.store, f.board_id, "b").await;
        let c = new_list(&f.store, f.board_id, "c").await;
        let archived = archive_list(&f.store, b.list.id).await.unwrap();
        assert!(archived.value.list.is_archived);
        assert_matches!(
            archived.events.as_slice(),
            [BoardEvent::ListDeleted(ListRemoved { list_id })] if *list_id == b.list.id
        );

        let board = read_board(&f.store, f.board_id).await.unwrap();
        let positions: Vec<_> = board.lists.iter().map(|l| (l.list.id, l.list.position)).collect();
        assert_eq!(
            positions,
            vec![(a.list.id, a.list.position), (c.list.id, c.list.position)]
        );
    }
}
