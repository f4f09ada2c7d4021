//! Board data model
//!
//! Row types mirror what the persistence layer stores. The `*View` types
//! are the hydrated shapes returned by reads and mutations and carried in
//! broadcast payloads; each view flattens its row so the JSON is
//! `{ ...entityFields, children }`.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::position::{sort_siblings, Positioned};

/// Default board background
pub const DEFAULT_BACKGROUND: &str = "#0079bf";

/// Default label colour
pub const DEFAULT_LABEL_COLOR: &str = "#61bd4f";

/// Colours seeded as unnamed labels on every new board
pub const DEFAULT_LABEL_COLORS: [&str; 6] = [
    "#61bd4f", "#f2d600", "#ff9f1a", "#eb5a46", "#c377e0", "#0079bf",
];

/// Current time at the microsecond precision the database keeps, so a
/// row returned by a mutation compares equal to the same row read back.
pub fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A user as seen by boards: card members and comment authors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Role of a user in a workspace or on a board
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

/// Top-level container for boards. Hard-deleted by its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row between a user and a workspace or board
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub user_id: Uuid,
    pub role: Role,
}

/// A user together with their role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleMember {
    #[serde(flatten)]
    pub member: Member,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub background_color: String,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub position: f64,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub list_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: f64,
    pub due_date: Option<DateTime<Utc>>,
    pub cover_color: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: Uuid,
    pub card_id: Uuid,
    pub title: String,
    pub position: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: Uuid,
    pub checklist_id: Uuid,
    pub title: String,
    pub position: f64,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub card_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full board as loaded by a client on open
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    #[serde(flatten)]
    pub board: Board,
    /// Board members with their roles
    #[serde(default)]
    pub members: Vec<RoleMember>,
    pub labels: Vec<Label>,
    pub lists: Vec<ListView>,
}

/// A workspace with its members and active boards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub members: Vec<RoleMember>,
    pub boards: Vec<Board>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    #[serde(flatten)]
    pub card: Card,
    pub labels: Vec<Label>,
    pub members: Vec<Member>,
    pub checklists: Vec<ChecklistView>,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistView {
    #[serde(flatten)]
    pub checklist: Checklist,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<Member>,
}

macro_rules! positioned {
    ($ty:ty, $row:ident) => {
        impl Positioned for $ty {
            fn position(&self) -> f64 {
                self.$row.position
            }
            fn created_at(&self) -> DateTime<Utc> {
                self.$row.created_at
            }
            fn id(&self) -> Uuid {
                self.$row.id
            }
        }
    };
    ($ty:ty) => {
        impl Positioned for $ty {
            fn position(&self) -> f64 {
                self.position
            }
            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

positioned!(List);
positioned!(Card);
positioned!(Checklist);
positioned!(ChecklistItem);
positioned!(ListView, list);
positioned!(CardView, card);
positioned!(ChecklistView, checklist);

/// Newest first, ties by id.
pub fn sort_comments(comments: &mut [CommentView]) {
    comments.sort_by(|a, b| {
        b.comment
            .created_at
            .cmp(&a.comment.created_at)
            .then_with(|| a.comment.id.cmp(&b.comment.id))
    });
}

/// Labels have no display order of their own; keep output stable.
pub fn sort_labels(labels: &mut [Label]) {
    labels.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

pub fn sort_members(members: &mut [Member]) {
    members.sort_by(|a, b| a.username.cmp(&b.username).then_with(|| a.id.cmp(&b.id)));
}

/// Admins first, then by username
pub fn sort_role_members(members: &mut [RoleMember]) {
    members.sort_by(|a, b| {
        a.role
            .cmp(&b.role)
            .then_with(|| a.member.username.cmp(&b.member.username))
            .then_with(|| a.member.id.cmp(&b.member.id))
    });
}

/// Oldest first, ties by id
pub fn sort_boards(boards: &mut [Board]) {
    boards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

impl WorkspaceView {
    pub fn new(workspace: Workspace, mut members: Vec<RoleMember>, mut boards: Vec<Board>) -> Self {
        sort_role_members(&mut members);
        sort_boards(&mut boards);
        Self {
            workspace,
            members,
            boards,
        }
    }
}

impl ChecklistView {
    pub fn new(checklist: Checklist, mut items: Vec<ChecklistItem>) -> Self {
        sort_siblings(&mut items);
        Self { checklist, items }
    }
}

impl CardView {
    /// Build a view with every child collection in display order.
    pub fn new(
        card: Card,
        mut labels: Vec<Label>,
        mut members: Vec<Member>,
        mut checklists: Vec<ChecklistView>,
        mut comments: Vec<CommentView>,
    ) -> Self {
        sort_labels(&mut labels);
        sort_members(&mut members);
        sort_siblings(&mut checklists);
        sort_comments(&mut comments);
        Self {
            card,
            labels,
            members,
            checklists,
            comments,
        }
    }
}

impl ListView {
    pub fn new(list: List, mut cards: Vec<CardView>) -> Self {
        sort_siblings(&mut cards);
        Self { list, cards }
    }
}

impl BoardView {
    pub fn new(board: Board, mut labels: Vec<Label>, mut lists: Vec<ListView>) -> Self {
        sort_labels(&mut labels);
        sort_siblings(&mut lists);
        Self {
            board,
            members: Vec::new(),
            labels,
            lists,
        }
    }

    pub fn with_members(mut self, mut members: Vec<RoleMember>) -> Self {
        sort_role_members(&mut members);
        self.members = members;
        self
    }

    pub fn list(&self, list_id: Uuid) -> Option<&ListView> {
        self.lists.iter().find(|l| l.list.id == list_id)
    }

    /// Find a card in any list
    pub fn card(&self, card_id: Uuid) -> Option<&CardView> {
        self.lists
            .iter()
            .flat_map(|l| l.cards.iter())
            .find(|c| c.card.id == card_id)
    }

    /// Card ids in display order, list by list
    pub fn card_order(&self) -> Vec<Vec<Uuid>> {
        self.lists
            .iter()
            .map(|l| l.cards.iter().map(|c| c.card.id).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(position: f64) -> Card {
        let now = Utc::now();
        Card {
            id: Uuid::new_v4(),
            list_id: Uuid::new_v4(),
            title: "card".to_string(),
            description: None,
            position,
            due_date: None,
            cover_color: None,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_card_view_serializes_flat() {
        let view = CardView::new(card(65536.0), vec![], vec![], vec![], vec![]);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["position"], 65536.0);
        assert_eq!(json["isArchived"], false);
        assert!(json["checklists"].as_array().unwrap().is_empty());
        assert!(json.get("card").is_none());
    }

    #[test]
    fn test_card_view_deserializes_flat() {
        let view = CardView::new(card(10.0), vec![], vec![], vec![], vec![]);
        let json = serde_json::to_string(&view).unwrap();
        let back: CardView = serde_json::from_str(&json).unwrap();
        assert_eq!(back, view);
    }

    #[test]
    fn test_comments_sorted_newest_first() {
        let author = Uuid::new_v4();
        let card_id = Uuid::new_v4();
        let base = Utc::now();
        let comment = |secs: i64| CommentView {
            comment: Comment {
                id: Uuid::new_v4(),
                card_id,
                author_id: author,
                text: format!("{secs}"),
                created_at: base + chrono::Duration::seconds(secs),
                updated_at: base,
            },
            author: None,
        };
        let view = CardView::new(card(1.0), vec![], vec![], vec![], vec![comment(1), comment(3), comment(2)]);
        let texts: Vec<&str> = view.comments.iter().map(|c| c.comment.text.as_str()).collect();
        assert_eq!(texts, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_timestamp_has_microsecond_precision() {
        let t = timestamp();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000, 0);
        let json = serde_json::to_string(&t).unwrap();
        let back: DateTime<Utc> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_role_members_admins_first() {
        let member = |name: &str, role| RoleMember {
            member: Member {
                id: Uuid::new_v4(),
                username: name.to_string(),
                email: format!("{name}@example.com"),
            },
            role,
        };
        let mut members = vec![
            member("zed", Role::Member),
            member("bob", Role::Viewer),
            member("yan", Role::Admin),
            member("amy", Role::Member),
        ];
        sort_role_members(&mut members);
        let names: Vec<&str> = members.iter().map(|m| m.member.username.as_str()).collect();
        assert_eq!(names, vec!["yan", "amy", "zed", "bob"]);
        let json = serde_json::to_value(&members[0]).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["username"], "yan");
    }
}
