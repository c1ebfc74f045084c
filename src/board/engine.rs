//! Repositioning engine.
//!
//! Translates a single drop event — `(task, target column, target index)` —
//! into the minimal set of order/column writes across one or two columns.
//! Plans are pure data computed from a snapshot of the affected columns; the
//! store backends read that snapshot, call in here, and apply the resulting
//! updates inside one transaction, so concurrent readers never observe an
//! intermediate (duplicate-order) state and a failure leaves nothing
//! partially shifted.
//!
//! Target indexes are 0-based insertion positions in display terms ("insert
//! before the task currently at this position"), clamped to the destination,
//! never raw order values.

use std::collections::HashSet;

use uuid::Uuid;

use super::ordering::{diff_orders, insert_at, remove_item, Positioned};
use super::BoardError;

/// One persisted order mutation: task `task_id` ends up in `column_id` at
/// `order`. For tasks that merely shift within their column, `column_id` is
/// unchanged; for the moved task in a cross-column move it is the new owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub task_id: Uuid,
    pub column_id: Uuid,
    pub order: i64,
}

/// Computes the update plan for moving `task_id` to `target_index` in
/// `target_column_id`.
///
/// `source` and `target` are the current task lists of the two columns,
/// sorted by stored order (pass the same list twice for a same-column
/// reorder). An empty plan means the move is a no-op.
///
/// Same-column: the index is interpreted against the list with the task
/// already removed, so a downward move inserts at `target_index - 1`; tasks
/// strictly between the old and new position shift by exactly one. Dropping a
/// task onto its own index changes nothing.
///
/// Cross-column: the source column closes its gap, the destination opens a
/// slot at the clamped index, and the task takes the opened slot — order 1 at
/// the front, `max + 1` at or past the end, otherwise the pre-shift order of
/// the task it displaces.
pub fn plan_move(
    task_id: Uuid,
    source_column_id: Uuid,
    source: &[Positioned],
    target_column_id: Uuid,
    target: &[Positioned],
    target_index: usize,
) -> Result<Vec<OrderUpdate>, BoardError> {
    let source_ids: Vec<Uuid> = source.iter().map(|p| p.id).collect();
    let removed =
        remove_item(&source_ids, task_id).ok_or_else(|| BoardError::task_not_found(task_id))?;

    if source_column_id == target_column_id {
        let current_index = source_ids
            .iter()
            .position(|id| *id == task_id)
            .ok_or_else(|| BoardError::task_not_found(task_id))?;
        if target_index == current_index {
            return Ok(Vec::new());
        }
        // Removal shifts everything after current_index left by one, so a
        // downward target lands one slot earlier in the shortened list.
        let effective = if target_index > current_index {
            target_index - 1
        } else {
            target_index
        };
        let arranged = insert_at(&removed, task_id, effective);
        Ok(tag(diff_orders(source, &arranged), source_column_id))
    } else {
        let target_ids: Vec<Uuid> = target.iter().map(|p| p.id).collect();
        if target_ids.contains(&task_id) {
            return Err(BoardError::Conflict(format!(
                "Task {} already present in column {}",
                task_id, target_column_id
            )));
        }
        let arranged = insert_at(&target_ids, task_id, target_index);

        let mut updates = tag(diff_orders(source, &removed), source_column_id);
        updates.extend(tag(diff_orders(target, &arranged), target_column_id));
        Ok(updates)
    }
}

/// Computes the update plan for a caller-supplied full permutation of a
/// column. The permutation must exactly match the column's current id set —
/// any missing, unknown, or duplicated id means the client's view was stale
/// and the whole call fails with [`BoardError::Conflict`] before anything is
/// written.
pub fn plan_reorder(
    current: &[Positioned],
    ordered: &[Uuid],
) -> Result<Vec<(Uuid, i64)>, BoardError> {
    if ordered.len() != current.len() {
        return Err(BoardError::Conflict(format!(
            "reorder carries {} ids but the column holds {} tasks",
            ordered.len(),
            current.len()
        )));
    }
    let members: HashSet<Uuid> = current.iter().map(|p| p.id).collect();
    let mut seen = HashSet::with_capacity(ordered.len());
    for id in ordered {
        if !members.contains(id) {
            return Err(BoardError::Conflict(format!(
                "Task {} does not belong to the column",
                id
            )));
        }
        if !seen.insert(*id) {
            return Err(BoardError::Conflict(format!(
                "Task {} appears more than once",
                id
            )));
        }
    }
    Ok(diff_orders(current, ordered))
}

/// Computes the gap-closing decrements after `item` leaves `current`. Used
/// for task deletion, the source half of a cross-column move, and column
/// deletion (the column namespace follows the same rules). Removing an id
/// that is already gone yields an empty plan.
pub fn plan_removal(current: &[Positioned], item: Uuid) -> Vec<(Uuid, i64)> {
    let ids: Vec<Uuid> = current.iter().map(|p| p.id).collect();
    match remove_item(&ids, item) {
        Some(remaining) => diff_orders(current, &remaining),
        None => Vec::new(),
    }
}

fn tag(updates: Vec<(Uuid, i64)>, column_id: Uuid) -> Vec<OrderUpdate> {
    updates
        .into_iter()
        .map(|(task_id, order)| OrderUpdate {
            task_id,
            column_id,
            order,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(n: usize) -> (Uuid, Vec<Uuid>, Vec<Positioned>) {
        let column_id = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..n).map(|_| Uuid::new_v4()).collect();
        let positioned = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Positioned::new(*id, i as i64 + 1))
            .collect();
        (column_id, ids, positioned)
    }

    /// Applies a plan to per-column id lists and checks density.
    fn apply(tasks: &[Positioned], plan: &[(Uuid, i64)]) -> Vec<Uuid> {
        let mut all: Vec<Positioned> = tasks.to_vec();
        for (id, order) in plan {
            match all.iter_mut().find(|p| p.id == *id) {
                Some(p) => p.order = *order,
                None => all.push(Positioned::new(*id, *order)),
            }
        }
        all.sort_by_key(|p| p.order);
        let orders: Vec<i64> = all.iter().map(|p| p.order).collect();
        let expected: Vec<i64> = (1..=all.len() as i64).collect();
        assert_eq!(orders, expected, "orders must be dense");
        all.into_iter().map(|p| p.id).collect()
    }

    fn untag(plan: &[OrderUpdate], column_id: Uuid) -> Vec<(Uuid, i64)> {
        plan.iter()
            .filter(|u| u.column_id == column_id)
            .map(|u| (u.task_id, u.order))
            .collect()
    }

    #[test]
    fn same_column_move_down_past_one() {
        // [T1, T2, T3], move T1 to index 2 -> [T2, T1, T3].
        let (col, ids, tasks) = column(3);
        let plan = plan_move(ids[0], col, &tasks, col, &tasks, 2).unwrap();
        let result = apply(&tasks, &untag(&plan, col));
        assert_eq!(result, vec![ids[1], ids[0], ids[2]]);
    }

    #[test]
    fn same_column_move_up_to_front() {
        let (col, ids, tasks) = column(3);
        let plan = plan_move(ids[2], col, &tasks, col, &tasks, 0).unwrap();
        let result = apply(&tasks, &untag(&plan, col));
        assert_eq!(result, vec![ids[2], ids[0], ids[1]]);
        // The moved task claims order 1.
        assert!(plan
            .iter()
            .any(|u| u.task_id == ids[2] && u.order == 1));
    }

    #[test]
    fn same_column_move_past_end_appends() {
        let (col, ids, tasks) = column(3);
        let plan = plan_move(ids[0], col, &tasks, col, &tasks, 99).unwrap();
        let result = apply(&tasks, &untag(&plan, col));
        assert_eq!(result, vec![ids[1], ids[2], ids[0]]);
        assert!(plan
            .iter()
            .any(|u| u.task_id == ids[0] && u.order == 3));
    }

    #[test]
    fn same_index_is_noop() {
        let (col, ids, tasks) = column(3);
        let plan = plan_move(ids[1], col, &tasks, col, &tasks, 1).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn dropping_before_own_successor_is_noop() {
        // Inserting before the task that already follows it resolves to the
        // same arrangement, so no writes are issued.
        let (col, ids, tasks) = column(3);
        let plan = plan_move(ids[1], col, &tasks, col, &tasks, 2).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn same_column_untouched_tasks_are_not_written() {
        // [A, B, C, D, E], move B to index 3: only B, C, D shift.
        let (col, ids, tasks) = column(5);
        let plan = plan_move(ids[1], col, &tasks, col, &tasks, 3).unwrap();
        let written: HashSet<Uuid> = plan.iter().map(|u| u.task_id).collect();
        assert_eq!(
            written,
            HashSet::from([ids[1], ids[2], ids[3]]),
            "only the moved task and the span between old and new positions shift"
        );
    }

    #[test]
    fn cross_column_move_to_front() {
        // A=[T1, T2], B=[T3]; move T1 to B index 0 -> A=[T2], B=[T1, T3].
        let (col_a, a_ids, a_tasks) = column(2);
        let (col_b, b_ids, b_tasks) = column(1);
        let plan = plan_move(a_ids[0], col_a, &a_tasks, col_b, &b_tasks, 0).unwrap();

        let remaining = apply(&[a_tasks[1]], &untag(&plan, col_a));
        assert_eq!(remaining, vec![a_ids[1]]);

        let dest = apply(&b_tasks, &untag(&plan, col_b));
        assert_eq!(dest, vec![a_ids[0], b_ids[0]]);

        // Moved task is reassigned to column B with order 1.
        let moved = plan.iter().find(|u| u.task_id == a_ids[0]).unwrap();
        assert_eq!(moved.column_id, col_b);
        assert_eq!(moved.order, 1);
    }

    #[test]
    fn cross_column_move_into_empty() {
        let (col_a, a_ids, a_tasks) = column(1);
        let col_b = Uuid::new_v4();
        let plan = plan_move(a_ids[0], col_a, &a_tasks, col_b, &[], 0).unwrap();
        assert_eq!(
            plan,
            vec![OrderUpdate {
                task_id: a_ids[0],
                column_id: col_b,
                order: 1
            }]
        );
    }

    #[test]
    fn cross_column_move_past_end_appends() {
        let (col_a, a_ids, a_tasks) = column(1);
        let (col_b, _, b_tasks) = column(3);
        let plan = plan_move(a_ids[0], col_a, &a_tasks, col_b, &b_tasks, 42).unwrap();
        let moved = plan.iter().find(|u| u.task_id == a_ids[0]).unwrap();
        assert_eq!(moved.order, 4);
        // No task in B shifts for an append.
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn cross_column_takes_displaced_tasks_slot() {
        // B = [X, Y, Z]; dropping at index 1 gives the mover Y's old order
        // and shifts Y and Z.
        let (col_a, a_ids, a_tasks) = column(1);
        let (col_b, b_ids, b_tasks) = column(3);
        let plan = plan_move(a_ids[0], col_a, &a_tasks, col_b, &b_tasks, 1).unwrap();
        let moved = plan.iter().find(|u| u.task_id == a_ids[0]).unwrap();
        assert_eq!(moved.order, 2);
        let b_plan = untag(&plan, col_b);
        assert!(b_plan.contains(&(b_ids[1], 3)));
        assert!(b_plan.contains(&(b_ids[2], 4)));
        assert!(!b_plan.iter().any(|(id, _)| *id == b_ids[0]));
    }

    #[test]
    fn cross_column_closes_source_gap() {
        // A = [T1, T2, T3]; moving T2 away decrements T3 only.
        let (col_a, a_ids, a_tasks) = column(3);
        let (col_b, _, b_tasks) = column(0);
        let plan = plan_move(a_ids[1], col_a, &a_tasks, col_b, &b_tasks, 0).unwrap();
        let a_plan = untag(&plan, col_a);
        assert_eq!(a_plan, vec![(a_ids[2], 2)]);
    }

    #[test]
    fn move_unknown_task_is_not_found() {
        let (col, _, tasks) = column(2);
        let err = plan_move(Uuid::new_v4(), col, &tasks, col, &tasks, 0).unwrap_err();
        assert!(matches!(err, BoardError::NotFound(_)));
    }

    #[test]
    fn reorder_full_permutation() {
        // [T1, T2, T3] -> [T3, T1, T2] assigns 1, 2, 3 positionally.
        let (_, ids, tasks) = column(3);
        let plan = plan_reorder(&tasks, &[ids[2], ids[0], ids[1]]).unwrap();
        let result = apply(&tasks, &plan);
        assert_eq!(result, vec![ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn reorder_identity_is_empty() {
        let (_, ids, tasks) = column(3);
        assert!(plan_reorder(&tasks, &ids).unwrap().is_empty());
    }

    #[test]
    fn reorder_rejects_wrong_count() {
        let (_, ids, tasks) = column(3);
        let err = plan_reorder(&tasks, &ids[..2]).unwrap_err();
        assert!(matches!(err, BoardError::Conflict(_)));
    }

    #[test]
    fn reorder_rejects_foreign_id() {
        let (_, ids, tasks) = column(2);
        let err = plan_reorder(&tasks, &[ids[0], Uuid::new_v4()]).unwrap_err();
        assert!(matches!(err, BoardError::Conflict(_)));
    }

    #[test]
    fn reorder_rejects_duplicate_id() {
        let (_, ids, tasks) = column(2);
        let err = plan_reorder(&tasks, &[ids[0], ids[0]]).unwrap_err();
        assert!(matches!(err, BoardError::Conflict(_)));
    }

    #[test]
    fn removal_shifts_later_tasks_down() {
        // [T1(1), T2(2), T3(3)] minus T2 -> T3 becomes 2.
        let (_, ids, tasks) = column(3);
        let plan = plan_removal(&tasks, ids[1]);
        assert_eq!(plan, vec![(ids[2], 2)]);
    }

    #[test]
    fn removal_of_last_task_is_empty_plan() {
        let (_, ids, tasks) = column(3);
        assert!(plan_removal(&tasks, ids[2]).is_empty());
    }

    #[test]
    fn removal_of_absent_task_is_empty_plan() {
        let (_, _, tasks) = column(3);
        assert!(plan_removal(&tasks, Uuid::new_v4()).is_empty());
    }
}
