/**
 * Board Event System
 *
 * Every change that peers need to see travels as a `BoardEnvelope`:
 * the board it belongs to, the `<entity>:<verb>` kind, and a payload.
 * `BoardEvent` is the tagged union of every kind, so one subscription
 * mechanism carries all of them.
 *
 * # Wire format
 *
 * ```json
 * {"boardId":"…","kind":"card:moved","payload":{…},"timestamp":"…"}
 * ```
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::board::{CardView, ChecklistItem, ChecklistView, CommentView, ListView};

/// Who is currently viewing a board
///
/// `user:joined` is sent for every connection that joins. `user:left` is
/// sent once the user has no connection left on the board, so its `users`
/// never contains `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    /// User that joined or left
    pub user_id: Uuid,
    /// Users still subscribed after the change, in join order
    pub users: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListMove {
    pub position: f64,
    pub list: ListView,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardMove {
    pub from_list_id: Uuid,
    pub list_id: Uuid,
    pub position: f64,
    pub card: CardView,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemChange {
    pub card_id: Uuid,
    pub item: ChecklistItem,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListRemoved {
    pub list_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardRemoved {
    pub card_id: Uuid,
    pub list_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentRemoved {
    pub comment_id: Uuid,
    pub card_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistRemoved {
    pub checklist_id: Uuid,
    pub card_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemRemoved {
    pub item_id: Uuid,
    pub checklist_id: Uuid,
    pub card_id: Uuid,
}

/// Every event a board channel carries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "payload")]
pub enum BoardEvent {
    #[serde(rename = "user:joined")]
    UserJoined(Presence),
    #[serde(rename = "user:left")]
    UserLeft(Presence),

    #[serde(rename = "list:created")]
    ListCreated(ListView),
    #[serde(rename = "list:updated")]
    ListUpdated(ListView),
    #[serde(rename = "list:moved")]
    ListMoved(ListMove),
    #[serde(rename = "list:deleted")]
    ListDeleted(ListRemoved),

    #[serde(rename = "card:created")]
    CardCreated(CardView),
    #[serde(rename = "card:updated")]
    CardUpdated(CardView),
    #[serde(rename = "card:moved")]
    CardMoved(CardMove),
    #[serde(rename = "card:deleted")]
    CardDeleted(CardRemoved),

    #[serde(rename = "comment:created")]
    CommentCreated(CommentView),
    #[serde(rename = "comment:deleted")]
    CommentDeleted(CommentRemoved),

    #[serde(rename = "checklist:created")]
    ChecklistCreated(ChecklistView),
    #[serde(rename = "checklist:updated")]
    ChecklistUpdated(ChecklistView),
    #[serde(rename = "checklist:deleted")]
    ChecklistDeleted(ChecklistRemoved),

    #[serde(rename = "checklistItem:created")]
    ChecklistItemCreated(ChecklistItemChange),
    #[serde(rename = "checklistItem:updated")]
    ChecklistItemUpdated(ChecklistItemChange),
    #[serde(rename = "checklistItem:deleted")]
    ChecklistItemDeleted(ChecklistItemRemoved),
}

impl BoardEvent {
    /// The `<entity>:<verb>` name, also used as the SSE event name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserJoined(_) => "user:joined",
            Self::UserLeft(_) => "user:left",
            Self::ListCreated(_) => "list:created",
            Self::ListUpdated(_) => "list:updated",
            Self::ListMoved(_) => "list:moved",
            Self::ListDeleted(_) => "list:deleted",
            Self::CardCreated(_) => "card:created",
            Self::CardUpdated(_) => "card:updated",
            Self::CardMoved(_) => "card:moved",
            Self::CardDeleted(_) => "card:deleted",
            Self::CommentCreated(_) => "comment:created",
            Self::CommentDeleted(_) => "comment:deleted",
            Self::ChecklistCreated(_) => "checklist:created",
            Self::ChecklistUpdated(_) => "checklist:updated",
            Self::ChecklistDeleted(_) => "checklist:deleted",
            Self::ChecklistItemCreated(_) => "checklistItem:created",
            Self::ChecklistItemUpdated(_) => "checklistItem:updated",
            Self::ChecklistItemDeleted(_) => "checklistItem:deleted",
        }
    }

    /// Presence events are produced by the channel itself, never by clients
    pub fn is_presence(&self) -> bool {
        matches!(self, Self::UserJoined(_) | Self::UserLeft(_))
    }
}

/// A board event addressed to one board's subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardEnvelope {
    pub board_id: Uuid,
    #[serde(flatten)]
    pub event: BoardEvent,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl BoardEnvelope {
    pub fn new(board_id: Uuid, event: BoardEvent) -> Self {
        Self {
            board_id,
            event,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.event.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_shape() {
        let board_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let envelope = BoardEnvelope::new(
            board_id,
            BoardEvent::UserJoined(Presence {
                user_id,
                users: vec![user_id],
            }),
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["boardId"], board_id.to_string());
        assert_eq!(json["kind"], "user:joined");
        assert_eq!(json["payload"]["userId"], user_id.to_string());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_envelope_parses_client_publish() {
        let board_id = Uuid::new_v4();
        let card_id = Uuid::new_v4();
        let list_id = Uuid::new_v4();
        let raw = serde_json::json!({
            "boardId": board_id,
            "kind": "card:deleted",
            "payload": { "cardId": card_id, "listId": list_id }
        });
        let envelope: BoardEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.board_id, board_id);
        assert_eq!(envelope.kind(), "card:deleted");
        assert_eq!(
            envelope.event,
            BoardEvent::CardDeleted(CardRemoved { card_id, list_id })
        );
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let raw = serde_json::json!({
            "boardId": Uuid::new_v4(),
            "kind": "board:exploded",
            "payload": {}
        });
        assert!(serde_json::from_value::<BoardEnvelope>(raw).is_err());
    }

    #[test]
    fn test_kind_matches_serde_tag() {
        let event = BoardEvent::ChecklistItemDeleted(ChecklistItemRemoved {
            item_id: Uuid::new_v4(),
            checklist_id: Uuid::new_v4(),
            card_id: Uuid::new_v4(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], event.kind());
        assert!(!event.is_presence());
    }
}
