/**
 * Position Allocation
 *
 * Lists, cards, checklists and checklist items are ordered among their
 * siblings by a floating point `position`. Inserting an item never
 * renumbers its siblings: the new value is either the midpoint of its two
 * neighbours, half of the first position, or the last position plus `GAP`.
 *
 * Clients and server run the same functions here, so both compute the
 * same value bit-for-bit from the same sibling snapshot.
 *
 * # Precision
 *
 * Repeated inserts at one boundary halve the gap each time. Once a
 * midpoint is no longer strictly between its neighbours the allocator
 * reports `PositionError::Exhausted` and the caller must renumber the
 * sibling set (see [`renumbered`]).
 */

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Spacing between consecutive positions after an append or a renumber.
pub const GAP: f64 = 65536.0;

/// Allocation failures
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum PositionError {
    /// No representable value exists between the neighbours at `index`
    #[error("no representable position left at index {index}")]
    Exhausted {
        /// Target index the caller asked for
        index: usize,
    },
}

/// Compute the position for an item inserted at `target` among `siblings`.
///
/// `siblings` must be sorted ascending. `None` (or an index at or past the
/// end) appends after the last sibling.
///
/// ```
/// use taskboard::shared::position::{allocate, GAP};
///
/// assert_eq!(allocate(None, &[]).unwrap(), GAP);
/// assert_eq!(allocate(Some(0), &[65536.0]).unwrap(), 32768.0);
/// assert_eq!(allocate(Some(1), &[32768.0, 65536.0]).unwrap(), 49152.0);
/// ```
pub fn allocate(target: Option<usize>, siblings: &[f64]) -> Result<f64, PositionError> {
    let len = siblings.len();
    let index = target.unwrap_or(len).min(len);

    let Some(&last) = siblings.last() else {
        return Ok(GAP);
    };

    let candidate = if index == len {
        last + GAP
    } else if index == 0 {
        siblings[0] / 2.0
    } else {
        (siblings[index - 1] + siblings[index]) / 2.0
    };

    let lower = if index == 0 { None } else { Some(siblings[index - 1]) };
    let upper = siblings.get(index).copied();
    if fits_between(candidate, lower, upper) {
        Ok(candidate)
    } else {
        Err(PositionError::Exhausted { index })
    }
}

/// Position that places an item after every sibling.
///
/// Past roughly `2^70` adding `GAP` no longer changes the value; check
/// [`has_room_after`] on the largest sibling before trusting the result.
pub fn append(siblings: &[f64]) -> f64 {
    siblings
        .iter()
        .copied()
        .fold(None, |max: Option<f64>, p| Some(max.map_or(p, |m| m.max(p))))
        .map_or(GAP, |max| max + GAP)
}

fn fits_between(candidate: f64, lower: Option<f64>, upper: Option<f64>) -> bool {
    if !candidate.is_finite() {
        return false;
    }
    let above = lower.is_none_or(|l| candidate > l);
    let below = upper.is_none_or(|u| candidate < u);
    // Head inserts halve toward zero; a zero or negative result can no longer be halved again.
    let positive_head = lower.is_some() || candidate > 0.0;
    above && below && positive_head
}

/// True when `last + GAP` is a finite value strictly above `last`.
pub fn has_room_after(last: f64) -> bool {
    let next = last + GAP;
    next.is_finite() && next > last
}

/// True when some adjacent pair in `sorted` leaves no room for a midpoint
/// (including exact ties), or nothing can be appended after the last
/// value, meaning the set should be renumbered.
pub fn needs_renumber(sorted: &[f64]) -> bool {
    let crowded = sorted.windows(2).any(|pair| {
        let mid = (pair[0] + pair[1]) / 2.0;
        !(pair[0] < mid && mid < pair[1])
    });
    crowded || sorted.last().is_some_and(|&last| !has_room_after(last))
}

/// Fresh positions for `count` siblings spaced by `GAP`, keeping order.
pub fn renumbered(count: usize) -> Vec<f64> {
    (1..=count).map(|i| i as f64 * GAP).collect()
}

/// Anything ordered among siblings by position.
///
/// Ties on position fall back to creation time and then id, so ordering is
/// total and does not depend on storage iteration order.
pub trait Positioned {
    fn position(&self) -> f64;
    fn created_at(&self) -> DateTime<Utc>;
    fn id(&self) -> Uuid;
}

/// Sibling ordering used by the reader and by client-side merges.
pub fn compare<T: Positioned>(a: &T, b: &T) -> Ordering {
    a.position()
        .total_cmp(&b.position())
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Sort siblings ascending by position.
pub fn sort_siblings<T: Positioned>(items: &mut [T]) {
    items.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_first_item_gets_gap() {
        assert_eq!(allocate(None, &[]).unwrap(), GAP);
        assert_eq!(allocate(Some(0), &[]).unwrap(), GAP);
        assert_eq!(allocate(Some(7), &[]).unwrap(), GAP);
    }

    #[test]
    fn test_append_after_last() {
        assert_eq!(allocate(None, &[65536.0, 131072.0]).unwrap(), 196608.0);
        assert_eq!(allocate(Some(9), &[65536.0]).unwrap(), 131072.0);
    }

    #[test]
    fn test_head_insert_halves_first() {
        assert_eq!(allocate(Some(0), &[65536.0, 131072.0]).unwrap(), 32768.0);
    }

    #[test]
    fn test_midpoint_insert() {
        assert_eq!(allocate(Some(1), &[32768.0, 65536.0]).unwrap(), 49152.0);
    }

    #[test]
    fn test_card_scenario() {
        // A appended, B at head, C between B and A
        let a = allocate(None, &[]).unwrap();
        assert_eq!(a, 65536.0);
        let b = allocate(Some(0), &[a]).unwrap();
        assert_eq!(b, 32768.0);
        let c = allocate(Some(1), &[b, a]).unwrap();
        assert_eq!(c, 49152.0);
    }

    #[test]
    fn test_exhausted_midpoint() {
        let a = 1.0_f64;
        let b = f64::from_bits(a.to_bits() + 1);
        assert_matches!(allocate(Some(1), &[a, b]), Err(PositionError::Exhausted { index: 1 }));
    }

    #[test]
    fn test_exhausted_on_tie() {
        assert_matches!(
            allocate(Some(1), &[10.0, 10.0]),
            Err(PositionError::Exhausted { .. })
        );
    }

    #[test]
    fn test_needs_renumber() {
        assert!(!needs_renumber(&[]));
        assert!(!needs_renumber(&[1.0]));
        assert!(!needs_renumber(&[1.0, 2.0, 3.0]));
        assert!(needs_renumber(&[1.0, 1.0]));
        let a = 1.0_f64;
        assert!(needs_renumber(&[a, f64::from_bits(a.to_bits() + 1)]));
    }

    #[test]
    fn test_no_room_after_huge_position() {
        assert!(has_room_after(GAP));
        assert!(!has_room_after(1e22));
        assert!(!has_room_after(f64::MAX));
        assert_eq!(append(&[1e22]), 1e22);
        assert!(needs_renumber(&[GAP, 1e22]));
        assert!(needs_renumber(&[1e22]));
        assert_matches!(allocate(None, &[1e22]), Err(PositionError::Exhausted { index: 1 }));
    }

    #[test]
    fn test_renumbered_spacing() {
        assert_eq!(renumbered(3), vec![65536.0, 131072.0, 196608.0]);
        assert!(renumbered(0).is_empty());
    }

    #[test]
    fn test_append_uses_max() {
        assert_eq!(append(&[]), GAP);
        assert_eq!(append(&[3.0, 100.0, 50.0]), 100.0 + GAP);
    }

    struct Item(f64, i64, u128);

    impl Positioned for Item {
        fn position(&self) -> f64 {
            self.0
        }
        fn created_at(&self) -> DateTime<Utc> {
            DateTime::from_timestamp(self.1, 0).unwrap()
        }
        fn id(&self) -> Uuid {
            Uuid::from_u128(self.2)
        }
    }

    #[test]
    fn test_sort_breaks_ties_by_creation_then_id() {
        let mut items = vec![Item(2.0, 0, 1), Item(1.0, 5, 9), Item(1.0, 5, 3), Item(1.0, 1, 7)];
        sort_siblings(&mut items);
        let order: Vec<u128> = items.iter().map(|i| i.2).collect();
        assert_eq!(order, vec![7, 3, 9, 1]);
    }
}
