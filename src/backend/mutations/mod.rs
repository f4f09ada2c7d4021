//! Mutation Handlers
//!
//! One async function per (entity, operation) pair. Each board-scoped
//! mutation validates its input, applies exactly one entity change (plus
//! join rows) through the [`BoardStore`], and returns an [`Applied`]
//! carrying the hydrated result together with the board events that
//! describe the change. Workspace mutations return plain values.
//!
//! Mutations never publish. The HTTP layer hands `Applied::events` to the
//! broadcast hub after the write succeeded, so a failed mutation leaves
//! both state and peers untouched.
//!
//! # Module Structure
//!
//! ```text
//! mutations/
//! ├── mod.rs          - Applied, lookups shared by every entity kind
//! ├── reorder.rs      - sibling placement and renumbering
//! ├── workspaces.rs   - workspaces (no board channel, no events)
//! ├── boards.rs       - boards
//! ├── labels.rs       - board labels
//! ├── lists.rs        - lists
//! ├── cards.rs        - cards, card labels and members
//! ├── checklists.rs   - checklists and checklist items
//! └── comments.rs     - comments
//! ```

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::BoardStore;
use crate::shared::board::{Board, Card, Checklist, ChecklistItem, List};
use crate::shared::event::BoardEvent;

pub mod boards;
pub mod cards;
pub mod checklists;
pub mod comments;
pub mod labels;
pub mod lists;
pub mod reorder;
pub mod workspaces;

pub use reorder::{Placement, SiblingSet};

/// Result of a successful mutation
#[derive(Debug, Clone)]
pub struct Applied<T> {
    /// Board whose channel the events belong to
    pub board_id: Uuid,
    /// Canonical representation returned to the caller
    pub value: T,
    /// Events for the board's other subscribers, in publish order
    pub events: Vec<BoardEvent>,
    /// Sibling set to renumber after the response has been sent
    pub repair: Option<SiblingSet>,
}

impl<T> Applied<T> {
    pub fn new(board_id: Uuid, value: T) -> Self {
        Self {
            board_id,
            value,
            events: Vec::new(),
            repair: None,
        }
    }

    pub fn with_event(mut self, event: BoardEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = BoardEvent>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn with_repair(mut self, repair: Option<SiblingSet>) -> Self {
        self.repair = repair;
        self
    }
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// An active board, or `NotFound`
pub(crate) async fn active_board(store: &dyn BoardStore, board_id: Uuid) -> BackendResult<Board> {
    store
        .get_board(board_id)
        .await?
        .filter(|b| !b.is_archived)
        .ok_or_else(|| BackendError::not_found("Board", board_id))
}

pub(crate) async fn find_list(store: &dyn BoardStore, list_id: Uuid) -> BackendResult<List> {
    store
        .get_list(list_id)
        .await?
        .ok_or_else(|| BackendError::not_found("List", list_id))
}

pub(crate) async fn find_card(store: &dyn BoardStore, card_id: Uuid) -> BackendResult<Card> {
    store
        .get_card(card_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Card", card_id))
}

/// A card and the list that owns it
pub(crate) async fn card_context(
    store: &dyn BoardStore,
    card_id: Uuid,
) -> BackendResult<(Card, List)> {
    let card = find_card(store, card_id).await?;
    let list = find_list(store, card.list_id).await?;
    Ok((card, list))
}

/// A checklist and the board it lives on
pub(crate) async fn checklist_context(
    store: &dyn BoardStore,
    checklist_id: Uuid,
) -> BackendResult<(Checklist, Uuid)> {
    let checklist = store
        .get_checklist(checklist_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Checklist", checklist_id))?;
    let (_, list) = card_context(store, checklist.card_id).await?;
    Ok((checklist, list.board_id))
}

/// An item, its checklist and the board it lives on
pub(crate) async fn item_context(
    store: &dyn BoardStore,
    item_id: Uuid,
) -> BackendResult<(ChecklistItem, Checklist, Uuid)> {
    let item = store
        .get_checklist_item(item_id)
        .await?
        .ok_or_else(|| BackendError::not_found("ChecklistItem", item_id))?;
    let (checklist, board_id) = checklist_context(store, item.checklist_id).await?;
    Ok((item, checklist, board_id))
}

/// Board that a sibling set belongs to
pub(crate) async fn board_of(store: &dyn BoardStore, set: SiblingSet) -> BackendResult<Uuid> {
    match set {
        SiblingSet::Lists { board_id } => Ok(board_id),
        SiblingSet::Cards { list_id } => Ok(find_list(store, list_id).await?.board_id),
        SiblingSet::Checklists { card_id } => Ok(card_context(store, card_id).await?.1.board_id),
        SiblingSet::Items { checklist_id } => Ok(checklist_context(store, checklist_id).await?.1),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::backend::store::MemoryStore;
    use crate::shared::board::Member;

    pub struct Fixture {
        pub store: MemoryStore,
        pub user: Member,
        pub workspace_id: Uuid,
        pub board_id: Uuid,
    }

    /// A store with one user, their workspace and one empty board
    pub async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let user = Member {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        store.insert_user(&user).await.unwrap();
        let workspace = workspaces::create_workspace(
            &store,
            user.id,
            workspaces::NewWorkspace {
                name: Some("Team".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();
        let workspace_id = workspace.workspace.id;
        let board = boards::create_board(
            &store,
            user.id,
            boards::NewBoard {
                workspace_id: Some(workspace_id),
                name: Some("Roadmap".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        Fixture {
            store,
            user,
            workspace_id,
            board_id: board.value.board.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        description: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.description, None);
        let null: Patch = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(null.description, Some(None));
        let set: Patch = serde_json::from_str(r#"{"description":"x"}"#).unwrap();
        assert_eq!(set.description, Some(Some("x".to_string())));
    }
}
