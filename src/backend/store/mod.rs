//! Persistence Module
//!
//! Everything the core reads or writes goes through [`BoardStore`]. The
//! reader and mutation handlers never assume how rows are stored or in
//! which order they come back: list-by-parent calls return rows in
//! unspecified order, archived rows included, and callers filter and sort.
//!
//! - **`memory`** - `MemoryStore`, process-local maps (no persistence)
//! - **`postgres`** - `PgStore`, sqlx over PostgreSQL

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::board::{
    Board, Card, Checklist, ChecklistItem, Comment, Label, List, Member, Membership, Workspace,
};

/// In-memory store
pub mod memory;

/// PostgreSQL store
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator
///
/// One group of calls per entity kind. `update_*` replaces every mutable
/// column of an existing row; `delete_*` exists only for hard-deleted kinds
/// and reports whether a row was removed.
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<Member>>;
    async fn insert_user(&self, user: &Member) -> StoreResult<()>;

    async fn get_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>>;
    /// Workspaces the user is a member of
    async fn workspaces_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Workspace>>;
    async fn insert_workspace(&self, workspace: &Workspace) -> StoreResult<()>;
    async fn update_workspace(&self, workspace: &Workspace) -> StoreResult<()>;
    /// Also removes the workspace's member rows
    async fn delete_workspace(&self, id: Uuid) -> StoreResult<bool>;

    async fn workspace_members(&self, workspace_id: Uuid) -> StoreResult<Vec<Membership>>;
    /// Upsert; a second call replaces the role
    async fn add_workspace_member(&self, workspace_id: Uuid, member: &Membership) -> StoreResult<()>;

    async fn get_board(&self, id: Uuid) -> StoreResult<Option<Board>>;
    async fn list_boards(&self) -> StoreResult<Vec<Board>>;
    async fn boards_for_workspace(&self, workspace_id: Uuid) -> StoreResult<Vec<Board>>;
    async fn insert_board(&self, board: &Board) -> StoreResult<()>;
    async fn update_board(&self, board: &Board) -> StoreResult<()>;

    async fn board_members(&self, board_id: Uuid) -> StoreResult<Vec<Membership>>;
    /// Upsert; a second call replaces the role
    async fn add_board_member(&self, board_id: Uuid, member: &Membership) -> StoreResult<()>;

    async fn get_label(&self, id: Uuid) -> StoreResult<Option<Label>>;
    async fn labels_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Label>>;
    async fn insert_label(&self, label: &Label) -> StoreResult<()>;
    async fn update_label(&self, label: &Label) -> StoreResult<()>;
    /// Also detaches the label from every card
    async fn delete_label(&self, id: Uuid) -> StoreResult<bool>;

    async fn get_list(&self, id: Uuid) -> StoreResult<Option<List>>;
    async fn lists_for_board(&self, board_id: Uuid) -> StoreResult<Vec<List>>;
    async fn insert_list(&self, list: &List) -> StoreResult<()>;
    async fn update_list(&self, list: &List) -> StoreResult<()>;

    async fn get_card(&self, id: Uuid) -> StoreResult<Option<Card>>;
    async fn cards_for_list(&self, list_id: Uuid) -> StoreResult<Vec<Card>>;
    async fn insert_card(&self, card: &Card) -> StoreResult<()>;
    async fn update_card(&self, card: &Card) -> StoreResult<()>;

    async fn card_labels(&self, card_id: Uuid) -> StoreResult<Vec<Label>>;
    /// Find-or-create; attaching twice is not an error
    async fn add_card_label(&self, card_id: Uuid, label_id: Uuid) -> StoreResult<()>;
    async fn remove_card_label(&self, card_id: Uuid, label_id: Uuid) -> StoreResult<bool>;

    async fn card_members(&self, card_id: Uuid) -> StoreResult<Vec<Member>>;
    /// Find-or-create; attaching twice is not an error
    async fn add_card_member(&self, card_id: Uuid, user_id: Uuid) -> StoreResult<()>;
    async fn remove_card_member(&self, card_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    async fn get_checklist(&self, id: Uuid) -> StoreResult<Option<Checklist>>;
    async fn checklists_for_card(&self, card_id: Uuid) -> StoreResult<Vec<Checklist>>;
    async fn insert_checklist(&self, checklist: &Checklist) -> StoreResult<()>;
    async fn update_checklist(&self, checklist: &Checklist) -> StoreResult<()>;
    async fn delete_checklist(&self, id: Uuid) -> StoreResult<bool>;

    async fn get_checklist_item(&self, id: Uuid) -> StoreResult<Option<ChecklistItem>>;
    async fn items_for_checklist(&self, checklist_id: Uuid) -> StoreResult<Vec<ChecklistItem>>;
    async fn insert_checklist_item(&self, item: &ChecklistItem) -> StoreResult<()>;
    async fn update_checklist_item(&self, item: &ChecklistItem) -> StoreResult<()>;
    async fn delete_checklist_item(&self, id: Uuid) -> StoreResult<bool>;

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    async fn comments_for_card(&self, card_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()>;
    async fn update_comment(&self, comment: &Comment) -> StoreResult<()>;
    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool>;
}
