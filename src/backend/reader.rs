/**
 * Board Aggregate Reader
 *
 * Assembles hydrated views from whatever the store returns. The store
 * hands back rows in no particular order and includes archived rows, so
 * every function here filters and sorts before returning.
 *
 * Reads have no side effects: the same persisted state always produces
 * the same view.
 */

use std::collections::HashMap;

use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::BoardStore;
use crate::shared::board::{
    BoardView, Card, CardView, Checklist, ChecklistView, Comment, CommentView, List, ListView,
    Member, Membership, RoleMember,
};

/// Load a board with its active lists and cards.
///
/// Fails with `NotFound` when the board is missing or archived.
pub async fn read_board(store: &dyn BoardStore, board_id: Uuid) -> BackendResult<BoardView> {
    let board = store
        .get_board(board_id)
        .await?
        .filter(|b| !b.is_archived)
        .ok_or_else(|| BackendError::not_found("Board", board_id))?;

    let labels = store.labels_for_board(board_id).await?;

    let mut lists = Vec::new();
    for list in store.lists_for_board(board_id).await? {
        if list.is_archived {
            continue;
        }
        lists.push(hydrate_list(store, list).await?);
    }

    let members = hydrate_members(store, store.board_members(board_id).await?).await?;

    tracing::debug!("[Board] Read board {} ({} lists)", board_id, lists.len());
    Ok(BoardView::new(board, labels, lists).with_members(members))
}

/// Join membership rows to their users. Rows whose user is gone are dropped.
pub async fn hydrate_members(
    store: &dyn BoardStore,
    memberships: Vec<Membership>,
) -> BackendResult<Vec<RoleMember>> {
    let mut members = Vec::with_capacity(memberships.len());
    for Membership { user_id, role } in memberships {
        if let Some(member) = store.get_user(user_id).await? {
            members.push(RoleMember { member, role });
        }
    }
    Ok(members)
}

/// A list with its active cards in position order
pub async fn hydrate_list(store: &dyn BoardStore, list: List) -> BackendResult<ListView> {
    let mut cards = Vec::new();
    for card in store.cards_for_list(list.id).await? {
        if card.is_archived {
            continue;
        }
        cards.push(hydrate_card(store, card).await?);
    }
    Ok(ListView::new(list, cards))
}

/// A card with labels, members, checklists (with items) and comments
pub async fn hydrate_card(store: &dyn BoardStore, card: Card) -> BackendResult<CardView> {
    let labels = store.card_labels(card.id).await?;
    let members = store.card_members(card.id).await?;

    let mut checklists = Vec::new();
    for checklist in store.checklists_for_card(card.id).await? {
        checklists.push(hydrate_checklist(store, checklist).await?);
    }

    let comments = hydrate_comments(store, store.comments_for_card(card.id).await?).await?;

    Ok(CardView::new(card, labels, members, checklists, comments))
}

pub async fn hydrate_checklist(
    store: &dyn BoardStore,
    checklist: Checklist,
) -> BackendResult<ChecklistView> {
    let items = store.items_for_checklist(checklist.id).await?;
    Ok(ChecklistView::new(checklist, items))
}

/// Attach authors, looking each distinct author up once
pub async fn hydrate_comments(
    store: &dyn BoardStore,
    comments: Vec<Comment>,
) -> BackendResult<Vec<CommentView>> {
    let mut authors: HashMap<Uuid, Option<Member>> = HashMap::new();
    let mut views = Vec::with_capacity(comments.len());
    for comment in comments {
        let author = match authors.get(&comment.author_id) {
            Some(author) => author.clone(),
            None => {
                let author = store.get_user(comment.author_id).await?;
                authors.insert(comment.author_id, author.clone());
                author
            }
        };
        views.push(CommentView { comment, author });
    }
    crate::shared::board::sort_comments(&mut views);
    Ok(views)
}

pub async fn hydrate_comment(store: &dyn BoardStore, comment: Comment) -> BackendResult<CommentView> {
    let author = store.get_user(comment.author_id).await?;
    Ok(CommentView { comment, author })
}

/// Hydrated card by id, archived or not
pub async fn load_card(store: &dyn BoardStore, card_id: Uuid) -> BackendResult<CardView> {
    let card = store
        .get_card(card_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Card", card_id))?;
    hydrate_card(store, card).await
}

pub async fn load_list(store: &dyn BoardStore, list_id: Uuid) -> BackendResult<ListView> {
    let list = store
        .get_list(list_id)
        .await?
        .ok_or_else(|| BackendError::not_found("List", list_id))?;
    hydrate_list(store, list).await
}
