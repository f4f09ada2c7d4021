/**
 * Sibling Placement and Renumbering
 *
 * Every positioned entity is placed among the active siblings of its
 * parent. A placement is one of:
 *
 * - `Last` - after every active sibling
 * - `Index(i)` - allocated against the current sibling snapshot
 * - `Exact(p)` - a client-computed value, persisted verbatim
 *
 * An index placement that runs out of precision renumbers the set first.
 * A verbatim value that collides with a neighbour is still persisted; the
 * set is flagged for a renumber that runs after the response.
 */

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::mutations::{board_of, checklist_context};
use crate::backend::reader::{hydrate_list, load_card, load_list};
use crate::backend::store::BoardStore;
use crate::shared::error::require_finite;
use crate::shared::event::{BoardEvent, ListMove};
use crate::shared::position::{
    allocate, append, has_room_after, needs_renumber, renumbered, sort_siblings, Positioned,
    PositionError,
};

/// A parent and the kind of children being ordered under it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingSet {
    Lists { board_id: Uuid },
    Cards { list_id: Uuid },
    Checklists { card_id: Uuid },
    Items { checklist_id: Uuid },
}

/// Requested spot for a created or moved item
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Placement {
    #[default]
    Last,
    Index(usize),
    Exact(f64),
}

impl Placement {
    /// From the optional `position` / `index` request fields
    pub fn from_request(position: Option<f64>, index: Option<usize>) -> BackendResult<Self> {
        match (position, index) {
            (Some(_), Some(_)) => Err(BackendError::validation(
                "position",
                "give either position or index, not both",
            )),
            (Some(p), None) => Ok(Self::Exact(require_finite("position", p)?)),
            (None, Some(i)) => Ok(Self::Index(i)),
            (None, None) => Ok(Self::Last),
        }
    }
}

/// Outcome of placing one item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placed {
    pub position: f64,
    /// The set was renumbered before allocating
    pub renumbered: bool,
    /// The set should be renumbered once the write is done
    pub needs_repair: bool,
}

/// Minimal view of a sibling row
#[derive(Debug, Clone, Copy)]
struct Sibling {
    id: Uuid,
    position: f64,
    created_at: DateTime<Utc>,
}

impl Positioned for Sibling {
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

macro_rules! sibling {
    ($row:expr) => {
        Sibling {
            id: $row.id,
            position: $row.position,
            created_at: $row.created_at,
        }
    };
}

/// Active siblings in display order
async fn siblings(store: &dyn BoardStore, set: SiblingSet) -> BackendResult<Vec<Sibling>> {
    let mut rows: Vec<Sibling> = match set {
        SiblingSet::Lists { board_id } => store
            .lists_for_board(board_id)
            .await?
            .iter()
            .filter(|l| !l.is_archived)
            .map(|l| sibling!(l))
            .collect(),
        SiblingSet::Cards { list_id } => store
            .cards_for_list(list_id)
            .await?
            .iter()
            .filter(|c| !c.is_archived)
            .map(|c| sibling!(c))
            .collect(),
        SiblingSet::Checklists { card_id } => store
            .checklists_for_card(card_id)
            .await?
            .iter()
            .map(|c| sibling!(c))
            .collect(),
        SiblingSet::Items { checklist_id } => store
            .items_for_checklist(checklist_id)
            .await?
            .iter()
            .map(|i| sibling!(i))
            .collect(),
    };
    sort_siblings(&mut rows);
    Ok(rows)
}

/// Sorted positions of the active siblings, leaving out `moving`
pub async fn positions(
    store: &dyn BoardStore,
    set: SiblingSet,
    moving: Option<Uuid>,
) -> BackendResult<Vec<f64>> {
    Ok(siblings(store, set)
        .await?
        .into_iter()
        .filter(|s| Some(s.id) != moving)
        .map(|s| s.position)
        .collect())
}

/// Compute the position for an item entering `set`.
///
/// `moving` is the item itself when it already belongs to the set.
pub async fn place(
    store: &dyn BoardStore,
    set: SiblingSet,
    placement: Placement,
    moving: Option<Uuid>,
) -> BackendResult<Placed> {
    let current = positions(store, set, moving).await?;
    let fresh = |position| Placed {
        position,
        renumbered: false,
        needs_repair: false,
    };

    match placement {
        Placement::Last => {
            if current.last().is_none_or(|&max| has_room_after(max)) {
                return Ok(fresh(append(&current)));
            }
            tracing::info!("[Board] No room after the last sibling in {:?}, renumbering", set);
            let count = renumber(store, set, moving).await?;
            Ok(Placed {
                position: (count + 1) as f64 * crate::shared::GAP,
                renumbered: true,
                needs_repair: false,
            })
        }
        Placement::Index(index) => match allocate(Some(index), &current) {
            Ok(position) => Ok(fresh(position)),
            Err(PositionError::Exhausted { index }) => {
                tracing::info!(
                    "[Board] Positions exhausted at index {} in {:?}, renumbering",
                    index,
                    set
                );
                let count = renumber(store, set, moving).await?;
                let position = allocate(Some(index), &renumbered(count)).map_err(|e| {
                    BackendError::internal(format!("allocation failed after renumber: {}", e))
                })?;
                Ok(Placed {
                    position,
                    renumbered: true,
                    needs_repair: false,
                })
            }
        },
        Placement::Exact(position) => {
            let mut after = current;
            let at = after.partition_point(|p| *p < position);
            after.insert(at, position);
            Ok(Placed {
                position,
                renumbered: false,
                needs_repair: needs_renumber(&after),
            })
        }
    }
}

/// Respace the active siblings of `set` by `GAP`, keeping their order.
///
/// `skip` is left untouched and not counted. Returns how many siblings were
/// renumbered.
pub async fn renumber(
    store: &dyn BoardStore,
    set: SiblingSet,
    skip: Option<Uuid>,
) -> BackendResult<usize> {
    let order: Vec<Uuid> = siblings(store, set)
        .await?
        .into_iter()
        .filter(|s| Some(s.id) != skip)
        .map(|s| s.id)
        .collect();
    let fresh = renumbered(order.len());

    for (id, position) in order.iter().copied().zip(fresh) {
        match set {
            SiblingSet::Lists { .. } => {
                if let Some(mut list) = store.get_list(id).await? {
                    list.position = position;
                    store.update_list(&list).await?;
                }
            }
            SiblingSet::Cards { .. } => {
                if let Some(mut card) = store.get_card(id).await? {
                    card.position = position;
                    store.update_card(&card).await?;
                }
            }
            SiblingSet::Checklists { .. } => {
                if let Some(mut checklist) = store.get_checklist(id).await? {
                    checklist.position = position;
                    store.update_checklist(&checklist).await?;
                }
            }
            SiblingSet::Items { .. } => {
                if let Some(mut item) = store.get_checklist_item(id).await? {
                    item.position = position;
                    store.update_checklist_item(&item).await?;
                }
            }
        }
    }

    tracing::debug!("[Board] Renumbered {} siblings in {:?}", order.len(), set);
    Ok(order.len())
}

/// Events that bring peers up to date with the current order of `set`
pub async fn renumber_events(
    store: &dyn BoardStore,
    set: SiblingSet,
) -> BackendResult<Vec<BoardEvent>> {
    match set {
        SiblingSet::Lists { board_id } => {
            let mut events = Vec::new();
            for list in store.lists_for_board(board_id).await? {
                if list.is_archived {
                    continue;
                }
                let position = list.position;
                let list = hydrate_list(store, list).await?;
                events.push(BoardEvent::ListMoved(ListMove { position, list }));
            }
            Ok(events)
        }
        SiblingSet::Cards { list_id } => {
            Ok(vec![BoardEvent::ListUpdated(load_list(store, list_id).await?)])
        }
        SiblingSet::Checklists { card_id } => {
            Ok(vec![BoardEvent::CardUpdated(load_card(store, card_id).await?)])
        }
        SiblingSet::Items { checklist_id } => {
            let (checklist, _) = checklist_context(store, checklist_id).await?;
            Ok(vec![BoardEvent::CardUpdated(
                load_card(store, checklist.card_id).await?,
            )])
        }
    }
}

/// Renumber `set` if it still needs it and return the board and events
/// to publish. Runs after a verbatim position left no room between
/// neighbours.
pub async fn repair(
    store: &dyn BoardStore,
    set: SiblingSet,
) -> BackendResult<Option<(Uuid, Vec<BoardEvent>)>> {
    let current = positions(store, set, None).await?;
    if !needs_renumber(&current) {
        return Ok(None);
    }
    renumber(store, set, None).await?;
    let board_id = board_of(store, set).await?;
    let events = renumber_events(store, set).await?;
    tracing::info!("[Board] Repaired ordering of {:?}", set);
    Ok(Some((board_id, events)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mutations::fixtures::fixture;
    use crate::backend::mutations::lists::{create_list, NewList};
    use crate::shared::GAP;
    use assert_matches::assert_matches;

    #[test]
    fn test_placement_from_request() {
        assert_eq!(Placement::from_request(None, None).unwrap(), Placement::Last);
        assert_eq!(
            Placement::from_request(Some(1.5), None).unwrap(),
            Placement::Exact(1.5)
        );
        assert_eq!(
            Placement::from_request(None, Some(2)).unwrap(),
            Placement::Index(2)
        );
        assert_matches!(
            Placement::from_request(Some(1.0), Some(1)),
            Err(BackendError::Validation { .. })
        );
        assert_matches!(
            Placement::from_request(Some(f64::NAN), None),
            Err(BackendError::Validation { .. })
        );
    }

    #[tokio::test]
    async fn test_exact_collision_flags_repair() {
        let f = fixture().await;
        let set = SiblingSet::Lists { board_id: f.board_id };
        for name in ["a", "b"] {
            create_list(
                &f.store,
                NewList {
                    board_id: Some(f.board_id),
                    name: Some(name.to_string()),
                },
            )
            .await
            .unwrap();
        }
        let clash = place(&f.store, set, Placement::Exact(GAP), None).await.unwrap();
        assert!(clash.needs_repair);
        let clean = place(&f.store, set, Placement::Exact(GAP * 1.5), None).await.unwrap();
        assert!(!clean.needs_repair);
    }

    #[tokio::test]
    async fn test_exhausted_index_renumbers_first() {
        let f = fixture().await;
        let set = SiblingSet::Lists { board_id: f.board_id };
        let a = create_list(
            &f.store,
            NewList {
                board_id: Some(f.board_id),
                name: Some("a".to_string()),
            },
        )
        .await
        .unwrap();
        let b = create_list(
            &f.store,
            NewList {
                board_id: Some(f.board_id),
                name: Some("b".to_string()),
            },
        )
        .await
        .unwrap();

        // Squeeze the two lists onto adjacent floats
        let mut first = a.value.list.clone();
        first.position = 1.0;
        f.store.update_list(&first).await.unwrap();
        let mut second = b.value.list.clone();
        second.position = f64::from_bits(1.0_f64.to_bits() + 1);
        f.store.update_list(&second).await.unwrap();

        let placed = place(&f.store, set, Placement::Index(1), None).await.unwrap();
        assert!(placed.renumbered);
        assert_eq!(placed.position, GAP * 1.5);
        assert_eq!(positions(&f.store, set, None).await.unwrap(), vec![GAP, GAP * 2.0]);
    }

    #[tokio::test]
    async fn test_exact_huge_position_flags_repair() {
        let f = fixture().await;
        let set = SiblingSet::Lists { board_id: f.board_id };
        let placed = place(&f.store, set, Placement::Exact(1e22), None).await.unwrap();
        assert!(placed.needs_repair);
    }

    #[tokio::test]
    async fn test_append_after_huge_position_renumbers() {
        let f = fixture().await;
        let set = SiblingSet::Lists { board_id: f.board_id };
        let a = create_list(
            &f.store,
            NewList {
                board_id: Some(f.board_id),
                name: Some("a".to_string()),
            },
        )
        .await
        .unwrap();
        let mut far = a.value.list.clone();
        far.position = 1e22;
        f.store.update_list(&far).await.unwrap();

        let placed = place(&f.store, set, Placement::Last, None).await.unwrap();
        assert!(placed.renumbered);
        assert_eq!(placed.position, GAP * 2.0);
        assert_eq!(positions(&f.store, set, None).await.unwrap(), vec![GAP]);
    }

    #[tokio::test]
    async fn test_repair_is_noop_when_ordered() {
        let f = fixture().await;
        let set = SiblingSet::Lists { board_id: f.board_id };
        assert!(repair(&f.store, set).await.unwrap().is_none());
    }
}
