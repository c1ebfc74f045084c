//! Dense-ordering primitives.
//!
//! A column's task order is represented as a slice of ids sorted by their
//! stored `order` value. The transformations here never assign order values
//! themselves; they produce target arrangements, and [`diff_orders`] turns an
//! arrangement into the minimal set of `order` writes. Assigning
//! `position + 1` over any arrangement produced here satisfies the dense
//! invariant: values are exactly `1..=len`, no gaps, no duplicates.

use uuid::Uuid;

/// An id paired with its currently stored order value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Positioned {
    pub id: Uuid,
    pub order: i64,
}

impl Positioned {
    pub fn new(id: Uuid, order: i64) -> Self {
        Self { id, order }
    }
}

/// Returns a new arrangement with `item` placed at `index`, shifting later
/// items right. `index` is clamped to `[0, len]`; `len` appends.
pub fn insert_at(list: &[Uuid], item: Uuid, index: usize) -> Vec<Uuid> {
    let index = index.min(list.len());
    let mut out = Vec::with_capacity(list.len() + 1);
    out.extend_from_slice(&list[..index]);
    out.push(item);
    out.extend_from_slice(&list[index..]);
    out
}

/// Returns a new arrangement with `item` removed, shifting later items left
/// to close the gap. `None` when the item is absent — callers treat that as
/// their not-found/no-op policy, since a concurrent delete may have raced
/// this operation.
pub fn remove_item(list: &[Uuid], item: Uuid) -> Option<Vec<Uuid>> {
    let index = list.iter().position(|id| *id == item)?;
    let mut out = Vec::with_capacity(list.len() - 1);
    out.extend_from_slice(&list[..index]);
    out.extend_from_slice(&list[index + 1..]);
    Some(out)
}

/// Assigns `order = position + 1` across `target` and returns only the pairs
/// whose value differs from what is currently stored. Ids absent from
/// `current` (a task entering the column) are always included. Because the
/// comparison is against stored values rather than positions, a column whose
/// stored orders have drifted out of the dense form is healed by the first
/// write that touches it.
pub fn diff_orders(current: &[Positioned], target: &[Uuid]) -> Vec<(Uuid, i64)> {
    let mut updates = Vec::new();
    for (index, id) in target.iter().enumerate() {
        let order = index as i64 + 1;
        let stored = current.iter().find(|p| p.id == *id).map(|p| p.order);
        if stored != Some(order) {
            updates.push((*id, order));
        }
    }
    updates
}
