/**
 * Board Mutations
 *
 * Boards are archived, never deleted. A new board belongs to a workspace,
 * starts with one unnamed label per default colour and has its creator as
 * admin member.
 */

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::mutations::{active_board, nullable, Applied};
use crate::backend::reader::read_board;
use crate::backend::store::BoardStore;
use crate::shared::board::{
    sort_boards, timestamp, Board, BoardView, Label, Membership, Role, DEFAULT_BACKGROUND,
    DEFAULT_LABEL_COLORS,
};
use crate::shared::error::{require, require_text};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    pub workspace_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub background_color: Option<String>,
}

pub async fn create_board(
    store: &dyn BoardStore,
    creator_id: Uuid,
    input: NewBoard,
) -> BackendResult<Applied<BoardView>> {
    let name = require_text("name", input.name.as_deref())?;
    let workspace_id = require("workspaceId", input.workspace_id)?;
    if store.get_workspace(workspace_id).await?.is_none() {
        return Err(BackendError::not_found("Workspace", workspace_id));
    }

    let now = timestamp();
    let board = Board {
        id: Uuid::new_v4(),
        workspace_id,
        name,
        description: input.description,
        background_color: input
            .background_color
            .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
        is_archived: false,
        created_at: now,
        updated_at: now,
    };
    store.insert_board(&board).await?;
    store
        .add_board_member(
            board.id,
            &Membership {
                user_id: creator_id,
                role: Role::Admin,
            },
        )
        .await?;

    for color in DEFAULT_LABEL_COLORS {
        store
            .insert_label(&Label {
                id: Uuid::new_v4(),
                board_id: board.id,
                name: String::new(),
                color: color.to_string(),
                created_at: now,
            })
            .await?;
    }

    tracing::debug!("[Board] Created board {} in workspace {}", board.id, workspace_id);
    let view = read_board(store, board.id).await?;
    Ok(Applied::new(board.id, view))
}

/// Active boards, oldest first, optionally limited to one workspace
pub async fn list_boards(
    store: &dyn BoardStore,
    workspace_id: Option<Uuid>,
) -> BackendResult<Vec<Board>> {
    let boards = match workspace_id {
        Some(id) => store.boards_for_workspace(id).await?,
        None => store.list_boards().await?,
    };
    let mut boards: Vec<Board> = boards.into_iter().filter(|b| !b.is_archived).collect();
    sort_boards(&mut boards);
    Ok(boards)
}

pub async fn update_board(
    store: &dyn BoardStore,
    board_id: Uuid,
    patch: BoardPatch,
) -> BackendResult<Applied<BoardView>> {
    let mut board = active_board(store, board_id).await?;
    if let Some(name) = patch.name {
        board.name = require_text("name", Some(name.as_str()))?;
    }
    if let Some(description) = patch.description {
        board.description = description;
    }
    if let Some(color) = patch.background_color {
        board.background_color = color;
    }
    board.updated_at = timestamp();
    store.update_board(&board).await?;

    tracing::debug!("[Board] Updated board {}", board_id);
    let view = read_board(store, board_id).await?;
    Ok(Applied::new(board_id, view))
}

/// Soft delete; the board disappears from reads and listings
pub async fn archive_board(store: &dyn BoardStore, board_id: Uuid) -> BackendResult<Applied<Board>> {
    let mut board = active_board(store, board_id).await?;
    board.is_archived = true;
    board.updated_at = timestamp();
    store.update_board(&board).await?;

    tracing::debug!("[Board] Archived board {}", board_id);
    Ok(Applied::new(board_id, board))
}
