//! Client-side merge of board events
//!
//! A client holding a `BoardView` folds each received envelope into it
//! instead of re-reading the whole board. Collections are re-sorted with
//! the same rule the server's reader uses, so a merged view and a fresh
//! read agree whenever they saw the same writes.

use uuid::Uuid;

use crate::shared::board::{sort_comments, BoardView, CardView, ChecklistView, ListView};
use crate::shared::event::{BoardEnvelope, BoardEvent};
use crate::shared::position::sort_siblings;

impl BoardView {
    /// Apply one envelope. Returns `false` when the event did not change
    /// the view (other board, presence, or an entity this view never saw).
    pub fn apply(&mut self, envelope: &BoardEnvelope) -> bool {
        if envelope.board_id != self.board.id {
            return false;
        }

        match &envelope.event {
            BoardEvent::UserJoined(_) | BoardEvent::UserLeft(_) => false,

            BoardEvent::ListCreated(list) | BoardEvent::ListUpdated(list) => self.upsert_list(list),
            BoardEvent::ListMoved(moved) => self.upsert_list(&moved.list),
            BoardEvent::ListDeleted(removed) => {
                let before = self.lists.len();
                self.lists.retain(|l| l.list.id != removed.list_id);
                before != self.lists.len()
            }

            BoardEvent::CardCreated(card) | BoardEvent::CardUpdated(card) => self.upsert_card(card),
            BoardEvent::CardMoved(moved) => self.upsert_card(&moved.card),
            BoardEvent::CardDeleted(removed) => self.remove_card(removed.card_id).is_some(),

            BoardEvent::CommentCreated(comment) => self.with_card(comment.comment.card_id, |card| {
                card.comments.retain(|c| c.comment.id != comment.comment.id);
                card.comments.push(comment.clone());
                sort_comments(&mut card.comments);
            }),
            BoardEvent::CommentDeleted(removed) => self.with_card(removed.card_id, |card| {
                card.comments.retain(|c| c.comment.id != removed.comment_id);
            }),

            BoardEvent::ChecklistCreated(checklist) | BoardEvent::ChecklistUpdated(checklist) => {
                self.with_card(checklist.checklist.card_id, |card| {
                    upsert_checklist(card, checklist);
                })
            }
            BoardEvent::ChecklistDeleted(removed) => self.with_card(removed.card_id, |card| {
                card.checklists.retain(|c| c.checklist.id != removed.checklist_id);
            }),

            BoardEvent::ChecklistItemCreated(change) | BoardEvent::ChecklistItemUpdated(change) => {
                self.with_checklist(change.card_id, change.item.checklist_id, |checklist| {
                    checklist.items.retain(|i| i.id != change.item.id);
                    checklist.items.push(change.item.clone());
                    sort_siblings(&mut checklist.items);
                })
            }
            BoardEvent::ChecklistItemDeleted(removed) => {
                self.with_checklist(removed.card_id, removed.checklist_id, |checklist| {
                    checklist.items.retain(|i| i.id != removed.item_id);
                })
            }
        }
    }

    fn upsert_list(&mut self, incoming: &ListView) -> bool {
        self.lists.retain(|l| l.list.id != incoming.list.id);
        if !incoming.list.is_archived {
            self.lists.push(incoming.clone());
        }
        sort_siblings(&mut self.lists);
        true
    }

    /// Insert or replace a card under its (possibly new) list.
    fn upsert_card(&mut self, incoming: &CardView) -> bool {
        self.remove_card(incoming.card.id);
        if incoming.card.is_archived {
            return true;
        }
        let Some(list) = self.lists.iter_mut().find(|l| l.list.id == incoming.card.list_id) else {
            return false;
        };
        list.cards.push(incoming.clone());
        sort_siblings(&mut list.cards);
        true
    }

    fn remove_card(&mut self, card_id: Uuid) -> Option<CardView> {
        for list in &mut self.lists {
            if let Some(index) = list.cards.iter().position(|c| c.card.id == card_id) {
                return Some(list.cards.remove(index));
            }
        }
        None
    }

    fn with_card(&mut self, card_id: Uuid, f: impl FnOnce(&mut CardView)) -> bool {
        let card = self
            .lists
            .iter_mut()
            .flat_map(|l| l.cards.iter_mut())
            .find(|c| c.card.id == card_id);
        match card {
            Some(card) => {
                f(card);
                true
            }
            None => false,
        }
    }

    fn with_checklist(
        &mut self,
        card_id: Uuid,
        checklist_id: Uuid,
        f: impl FnOnce(&mut ChecklistView),
    ) -> bool {
        let mut applied = false;
        self.with_card(card_id, |card| {
            if let Some(checklist) = card.checklists.iter_mut().find(|c| c.checklist.id == checklist_id) {
                f(checklist);
                applied = true;
            }
        });
        applied
    }
}

fn upsert_checklist(card: &mut CardView, incoming: &ChecklistView) {
    card.checklists.retain(|c| c.checklist.id != incoming.checklist.id);
    card.checklists.push(incoming.clone());
    sort_siblings(&mut card.checklists);
}
