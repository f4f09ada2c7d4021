/**
 * In-Memory Store
 *
 * Keeps every row in process-local hash maps behind one
 * `tokio::sync::RwLock`. Used when no database is configured and by the
 * test suite. Nothing survives a restart.
 */

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::store::{BoardStore, StoreResult};
use crate::shared::board::{
    Board, Card, Checklist, ChecklistItem, Comment, Label, List, Member, Membership, Role,
    Workspace,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, Member>,
    workspaces: HashMap<Uuid, Workspace>,
    /// (workspace_id, user_id) -> role
    workspace_members: HashMap<(Uuid, Uuid), Role>,
    boards: HashMap<Uuid, Board>,
    /// (board_id, user_id) -> role
    board_members: HashMap<(Uuid, Uuid), Role>,
    labels: HashMap<Uuid, Label>,
    lists: HashMap<Uuid, List>,
    cards: HashMap<Uuid, Card>,
    checklists: HashMap<Uuid, Checklist>,
    items: HashMap<Uuid, ChecklistItem>,
    comments: HashMap<Uuid, Comment>,
    /// (card_id, label_id)
    card_labels: HashSet<(Uuid, Uuid)>,
    /// (card_id, user_id)
    card_members: HashSet<(Uuid, Uuid)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn memberships(rows: &HashMap<(Uuid, Uuid), Role>, parent: Uuid) -> Vec<Membership> {
    rows.iter()
        .filter(|((p, _), _)| *p == parent)
        .map(|(&(_, user_id), &role)| Membership { user_id, role })
        .collect()
}

fn children<T: Clone>(rows: &HashMap<Uuid, T>, parent: impl Fn(&T) -> bool) -> Vec<T> {
    rows.values().filter(|row| parent(row)).cloned().collect()
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<Member>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: &Member) -> StoreResult<()> {
        self.tables.write().await.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>> {
        Ok(self.tables.read().await.workspaces.get(&id).cloned())
    }

    async fn workspaces_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Workspace>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workspace_members
            .keys()
            .filter(|(_, u)| *u == user_id)
            .filter_map(|(workspace_id, _)| tables.workspaces.get(workspace_id).cloned())
            .collect())
    }

    async fn insert_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .workspaces
            .insert(workspace.id, workspace.clone());
        Ok(())
    }

    async fn update_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        self.insert_workspace(workspace).await
    }

    async fn delete_workspace(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.workspace_members.retain(|(workspace_id, _), _| *workspace_id != id);
        Ok(tables.workspaces.remove(&id).is_some())
    }

    async fn workspace_members(&self, workspace_id: Uuid) -> StoreResult<Vec<Membership>> {
        Ok(memberships(&self.tables.read().await.workspace_members, workspace_id))
    }

    async fn add_workspace_member(&self, workspace_id: Uuid, member: &Membership) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .workspace_members
            .insert((workspace_id, member.user_id), member.role);
        Ok(())
    }

    async fn get_board(&self, id: Uuid) -> StoreResult<Option<Board>> {
        Ok(self.tables.read().await.boards.get(&id).cloned())
    }

    async fn list_boards(&self) -> StoreResult<Vec<Board>> {
        Ok(self.tables.read().await.boards.values().cloned().collect())
    }

    async fn boards_for_workspace(&self, workspace_id: Uuid) -> StoreResult<Vec<Board>> {
        let tables = self.tables.read().await;
        Ok(children(&tables.boards, |b| b.workspace_id == workspace_id))
    }

    async fn insert_board(&self, board: &Board) -> StoreResult<()> {
        self.tables.write().await.boards.insert(board.id, board.clone());
        Ok(())
    }

    async fn update_board(&self, board: &Board) -> StoreResult<()> {
        self.insert_board(board).await
    }

    async fn board_members(&self, board_id: Uuid) -> StoreResult<Vec<Membership>> {
        Ok(memberships(&self.tables.read().await.board_members, board_id))
    }

    async fn add_board_member(&self, board_id: Uuid, member: &Membership) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .board_members
            .insert((board_id, member.user_id), member.role);
        Ok(())
    }

    async fn get_label(&self, id: Uuid) -> StoreResult<Option<Label>> {
        Ok(self.tables.read().await.labels.get(&id).cloned())
    }

    async fn labels_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Label>> {
        let tables = self.tables.read().await;
        Ok(children(&tables.labels, |l| l.board_id == board_id))
    }

    async fn insert_label(&self, label: &Label) -> StoreResult<()> {
        self.tables.write().await.labels.insert(label.id, label.clone());
        Ok(())
    }

    async fn update_label(&self, label: &Label) -> StoreResult<()> {
        self.insert_label(label).await
    }

    async fn delete_label(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.card_labels.retain(|(_, label_id)| *label_id != id);
        Ok(tables.labels.remove(&id).is_some())
    }

    async fn get_list(&self, id: Uuid) -> StoreResult<Option<List>> {
        Ok(self.tables.read().await.lists.get(&id).cloned())
    }

    async fn lists_for_board(&self, board_id: Uuid) -> StoreResult<Vec<List>> {
        let tables = self.tables.read().await;
        Ok(children(&tables.lists, |l| l.board_id == board_id))
    }

    async fn insert_list(&self, list: &List) -> StoreResult<()> {
        self.tables.write().await.lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn update_list(&self, list: &List) -> StoreResult<()> {
        self.insert_list(list).await
    }

    async fn get_card(&self, id: Uuid) -> StoreResult<Option<Card>> {
        Ok(self.tables.read().await.cards.get(&id).cloned())
    }

    async fn cards_for_list(&self, list_id: Uuid) -> StoreResult<Vec<Card>> {
        let tables = self.tables.read().await;
        Ok(children(&tables.cards, |c| c.list_id == list_id))
    }

    async fn insert_card(&self, card: &Card) -> StoreResult<()> {
        self.tables.write().await.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn update_card(&self, card: &Card) -> StoreResult<()> {
        self.insert_card(card).await
    }

    async fn card_labels(&self, card_id: Uuid) -> StoreResult<Vec<Label>> {
        let tables = self.tables.read().await;
        Ok(tables
            .card_labels
            .iter()
            .filter(|(c, _)| *c == card_id)
            .filter_map(|(_, label_id)| tables.labels.get(label_id).cloned())
            .collect())
    }

    async fn add_card_label(&self, card_id: Uuid, label_id: Uuid) -> StoreResult<()> {
        self.tables.write().await.card_labels.insert((card_id, label_id));
        Ok(())
    }

    async fn remove_card_label(&self, card_id: Uuid, label_id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.card_labels.remove(&(card_id, label_id)))
    }

    async fn card_members(&self, card_id: Uuid) -> StoreResult<Vec<Member>> {
        let tables = self.tables.read().await;
        Ok(tables
            .card_members
            .iter()
            .filter(|(c, _)| *c == card_id)
            .filter_map(|(_, user_id)| tables.users.get(user_id).cloned())
            .collect())
    }

    async fn add_card_member(&self, card_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.tables.write().await.card_members.insert((card_id, user_id));
        Ok(())
    }

    async fn remove_card_member(&self, card_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.card_members.remove(&(card_id, user_id)))
    }

    async fn get_checklist(&self, id: Uuid) -> StoreResult<Option<Checklist>> {
        Ok(self.tables.read().await.checklists.get(&id).cloned())
    }

    async fn checklists_for_card(&self, card_id: Uuid) -> StoreResult<Vec<Checklist>> {
        let tables = self.tables.read().await;
        Ok(children(&tables.checklists, |c| c.card_id == card_id))
    }

    async fn insert_checklist(&self, checklist: &Checklist) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .checklists
            .insert(checklist.id, checklist.clone());
        Ok(())
    }

    async fn update_checklist(&self, checklist: &Checklist) -> StoreResult<()> {
        self.insert_checklist(checklist).await
    }

    async fn delete_checklist(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.checklists.remove(&id).is_some())
    }

    async fn get_checklist_item(&self, id: Uuid) -> StoreResult<Option<ChecklistItem>> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn items_for_checklist(&self, checklist_id: Uuid) -> StoreResult<Vec<ChecklistItem>> {
        let tables = self.tables.read().await;
        Ok(children(&tables.items, |i| i.checklist_id == checklist_id))
    }

    async fn insert_checklist_item(&self, item: &ChecklistItem) -> StoreResult<()> {
        self.tables.write().await.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_checklist_item(&self, item: &ChecklistItem) -> StoreResult<()> {
        self.insert_checklist_item(item).await
    }

    async fn delete_checklist_item(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.items.remove(&id).is_some())
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn comments_for_card(&self, card_id: Uuid) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(children(&tables.comments, |c| c.card_id == card_id))
    }

    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .comments
            .insert(comment.id, comment.clone());
        Ok(())
    }

    async fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        self.insert_comment(comment).await
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }
}
