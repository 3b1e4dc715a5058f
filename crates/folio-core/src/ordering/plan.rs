//! Shift planning.
//!
//! These functions compute which ordinals change for an insert, move,
//! removal or renumber, given a snapshot of the partition. They do no I/O;
//! [`OrderedCollection`](super::OrderedCollection) reads the snapshot,
//! plans, and writes the result back.
//!
//! Legacy entries (no order) never appear in a shift range: every range
//! test is made against an explicit order.
//!
//! Stored orders are untrusted. An order that cannot be moved by one fails
//! the plan with [`InvalidInputError::OrderOutOfRange`]; `plan_renumber`
//! does no arithmetic on stored orders and is the way out.

use crate::Result;
use crate::error::InvalidInputError;
use crate::types::RecordId;

use super::entry::{Entry, sort_entries};

/// One ordinal change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    /// The shifted record.
    pub id: RecordId,
    /// Order before the shift, `None` for a legacy record.
    pub from: Option<i64>,
    /// Order after the shift.
    pub to: i64,
}

/// Result of [`plan_insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    /// Order the new record receives.
    pub order: i64,
    /// Existing records moved out of the way.
    pub shifts: Vec<Shift>,
}

/// Result of [`plan_reorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    /// Order the moved record ends up with; `None` if it stays legacy.
    pub order: Option<i64>,
    /// Other records rotated past the moved one.
    pub shifts: Vec<Shift>,
}

impl ReorderPlan {
    /// Returns true if no ordinal changes.
    pub fn is_noop(&self, current: Option<i64>) -> bool {
        self.shifts.is_empty() && self.order == current
    }
}

/// The append position: one past the highest explicit order at or above
/// `base`, or `base` for an empty partition.
pub fn append_position(entries: &[Entry], base: i64) -> Result<i64> {
    let last = entries
        .iter()
        .filter_map(|e| e.order.map(|o| (o, e)))
        .filter(|&(o, _)| o >= base)
        .max_by_key(|&(o, _)| o);

    match last {
        Some((max, entry)) => step(entry, max, 1),
        None => Ok(base),
    }
}

/// Plan an insert into a partition holding `entries`.
///
/// A desired order below `base`, or none at all, appends. A desired order
/// past the append position is clamped to it, so the partition stays dense.
/// Every record at or after the final order moves up by one.
pub fn plan_insert(entries: &[Entry], desired: Option<i64>, base: i64) -> Result<InsertPlan> {
    let append = append_position(entries, base)?;
    let order = match desired {
        Some(d) if d >= base => d.min(append),
        _ => append,
    };

    let shifts = shifted(entries, |o| o >= order, 1)?;

    Ok(InsertPlan { order, shifts })
}

/// Plan a move of one record within its partition.
///
/// `others` is the partition without the moved record, `current` its stored
/// order. A requested order below `base` is raised to `base`; one past the
/// end is lowered to the last slot. Without a requested order nothing moves.
///
/// A legacy record, or one stored below `base`, holds no slot in the dense
/// range; giving it an order inserts it.
pub fn plan_reorder(
    others: &[Entry],
    current: Option<i64>,
    requested: Option<i64>,
    base: i64,
) -> Result<ReorderPlan> {
    let Some(requested) = requested else {
        return Ok(ReorderPlan {
            order: current,
            shifts: Vec::new(),
        });
    };

    let Some(old) = current.filter(|&o| o >= base) else {
        let plan = plan_insert(others, Some(requested.max(base)), base)?;
        return Ok(ReorderPlan {
            order: Some(plan.order),
            shifts: plan.shifts,
        });
    };

    let last = (append_position(others, base)? - 1).max(old);
    let new = requested.max(base).min(last);

    let shifts = if new < old {
        shifted(others, |o| o >= new && o < old, 1)?
    } else if new > old {
        shifted(others, |o| o > old && o <= new, -1)?
    } else {
        Vec::new()
    };

    Ok(ReorderPlan {
        order: Some(new),
        shifts,
    })
}

/// Plan closing the gap left by a removed record.
///
/// `remaining` is the partition after the removal. Removing a legacy
/// record, or one stored below `base`, shifts nothing.
pub fn plan_remove(remaining: &[Entry], removed: Option<i64>, base: i64) -> Result<Vec<Shift>> {
    match removed {
        Some(gap) if gap >= base => shifted(remaining, |o| o > gap, -1),
        _ => Ok(Vec::new()),
    }
}

/// Plan rewriting a partition to `base..base+N` in display order.
///
/// Legacy records receive explicit trailing orders. Records already at
/// their target are left out.
pub fn plan_renumber(entries: &[Entry], base: i64) -> Vec<Shift> {
    let mut sorted = entries.to_vec();
    sort_entries(&mut sorted);

    sorted
        .into_iter()
        .zip(base..)
        .filter(|(entry, target)| entry.order != Some(*target))
        .map(|(entry, target)| Shift {
            id: entry.id,
            from: entry.order,
            to: target,
        })
        .collect()
}

fn shifted(
    entries: &[Entry],
    in_range: impl Fn(i64) -> bool,
    delta: i64,
) -> Result<Vec<Shift>> {
    entries
        .iter()
        .filter_map(|e| match e.order {
            Some(o) if in_range(o) => Some(step(e, o, delta).map(|to| Shift {
                id: e.id.clone(),
                from: Some(o),
                to,
            })),
            _ => None,
        })
        .collect()
}

fn step(entry: &Entry, order: i64, delta: i64) -> Result<i64> {
    order.checked_add(delta).ok_or_else(|| {
        InvalidInputError::OrderOutOfRange {
            id: entry.id.to_string(),
            order,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn entry(id: &str, order: Option<i64>) -> Entry {
        Entry::new(RecordId::new(id).unwrap(), order)
    }

    fn partition(orders: &[(&str, i64)]) -> Vec<Entry> {
        orders.iter().map(|(id, o)| entry(id, Some(*o))).collect()
    }

    fn moves(shifts: &[Shift]) -> Vec<(&str, i64)> {
        let mut v: Vec<_> = shifts.iter().map(|s| (s.id.as_str(), s.to)).collect();
        v.sort();
        v
    }

    #[test]
    fn insert_without_order_appends() {
        let entries = partition(&[("a", 0), ("b", 1), ("c", 2)]);
        let plan = plan_insert(&entries, None, 0).unwrap();
        assert_eq!(plan.order, 3);
        assert!(plan.shifts.is_empty());
    }

    #[test]
    fn insert_into_empty_partition_uses_base() {
        assert_eq!(plan_insert(&[], None, 0).unwrap().order, 0);
        assert_eq!(plan_insert(&[], None, 1).unwrap().order, 1);
        assert_eq!(plan_insert(&[], Some(7), 1).unwrap().order, 1);
    }

    #[test]
    fn insert_in_middle_shifts_tail() {
        let entries = partition(&[("a", 0), ("b", 1), ("c", 2)]);
        let plan = plan_insert(&entries, Some(1), 0).unwrap();
        assert_eq!(plan.order, 1);
        assert_eq!(moves(&plan.shifts), [("b", 2), ("c", 3)]);
    }

    #[test]
    fn insert_below_base_appends() {
        let entries = partition(&[("a", 1), ("b", 2)]);
        let plan = plan_insert(&entries, Some(0), 1).unwrap();
        assert_eq!(plan.order, 3);
        assert!(plan.shifts.is_empty());
    }

    #[test]
    fn insert_past_end_is_clamped() {
        let entries = partition(&[("a", 0), ("b", 1)]);
        let plan = plan_insert(&entries, Some(40), 0).unwrap();
        assert_eq!(plan.order, 2);
        assert!(plan.shifts.is_empty());
    }

    #[test]
    fn insert_ignores_legacy_entries() {
        let mut entries = partition(&[("a", 0), ("b", 1)]);
        entries.push(entry("old", None));
        let plan = plan_insert(&entries, Some(0), 0).unwrap();
        assert_eq!(moves(&plan.shifts), [("a", 1), ("b", 2)]);

        let plan = plan_insert(&entries, None, 0).unwrap();
        assert_eq!(plan.order, 2);
    }

    #[test]
    fn reorder_earlier_rotates_up() {
        // {(A,0),(B,1),(C,2),(D,3)}: D -> 1
        let others = partition(&[("a", 0), ("b", 1), ("c", 2)]);
        let plan = plan_reorder(&others, Some(3), Some(1), 0).unwrap();
        assert_eq!(plan.order, Some(1));
        assert_eq!(moves(&plan.shifts), [("b", 2), ("c", 3)]);
    }

    #[test]
    fn reorder_later_rotates_down() {
        // {(A,0),(B,1),(C,2),(D,3)}: A -> 2
        let others = partition(&[("b", 1), ("c", 2), ("d", 3)]);
        let plan = plan_reorder(&others, Some(0), Some(2), 0).unwrap();
        assert_eq!(plan.order, Some(2));
        assert_eq!(moves(&plan.shifts), [("b", 0), ("c", 1)]);
    }

    #[test]
    fn reorder_same_position_is_noop() {
        let others = partition(&[("a", 0), ("c", 2)]);
        let plan = plan_reorder(&others, Some(1), Some(1), 0).unwrap();
        assert!(plan.is_noop(Some(1)));
    }

    #[test]
    fn reorder_without_request_keeps_order() {
        let others = partition(&[("a", 0)]);
        assert!(plan_reorder(&others, Some(1), None, 0).unwrap().is_noop(Some(1)));
        assert!(plan_reorder(&others, None, None, 0).unwrap().is_noop(None));
    }

    #[test]
    fn reorder_clamps_to_base_and_end() {
        let others = partition(&[("a", 1), ("b", 2), ("c", 3)]);

        let plan = plan_reorder(&others, Some(4), Some(-5), 1).unwrap();
        assert_eq!(plan.order, Some(1));
        assert_eq!(moves(&plan.shifts), [("a", 2), ("b", 3), ("c", 4)]);

        let plan = plan_reorder(&others, Some(4), Some(99), 1).unwrap();
        assert!(plan.is_noop(Some(4)));

        let others = partition(&[("b", 2), ("c", 3), ("d", 4)]);
        let plan = plan_reorder(&others, Some(1), Some(99), 1).unwrap();
        assert_eq!(plan.order, Some(4));
        assert_eq!(moves(&plan.shifts), [("b", 1), ("c", 2), ("d", 3)]);
    }

    #[test]
    fn reorder_legacy_record_inserts_it() {
        let others = partition(&[("a", 0), ("b", 1), ("c", 2)]);
        let plan = plan_reorder(&others, None, Some(1), 0).unwrap();
        assert_eq!(plan.order, Some(1));
        assert_eq!(moves(&plan.shifts), [("b", 2), ("c", 3)]);

        let plan = plan_reorder(&others, None, Some(50), 0).unwrap();
        assert_eq!(plan.order, Some(3));
        assert!(plan.shifts.is_empty());
    }

    #[test]
    fn reorder_leaves_legacy_others_alone() {
        let mut others = partition(&[("a", 0), ("b", 1)]);
        others.push(entry("old", None));
        let plan = plan_reorder(&others, Some(2), Some(0), 0).unwrap();
        assert_eq!(moves(&plan.shifts), [("a", 1), ("b", 2)]);
    }

    #[test]
    fn remove_closes_gap() {
        // {(A,0),(B,1),(C,2)}: remove B
        let remaining = partition(&[("a", 0), ("c", 2)]);
        let shifts = plan_remove(&remaining, Some(1), 0).unwrap();
        assert_eq!(moves(&shifts), [("c", 1)]);
    }

    #[test]
    fn remove_legacy_shifts_nothing() {
        let remaining = partition(&[("a", 0), ("c", 1)]);
        assert!(plan_remove(&remaining, None, 0).unwrap().is_empty());
    }

    #[test]
    fn renumber_repairs_duplicates_gaps_and_legacy() {
        let entries = vec![
            entry("a", Some(0)),
            entry("b", Some(2)),
            entry("c", Some(2)),
            entry("d", Some(7)),
            entry("old", None),
        ];
        let shifts = plan_renumber(&entries, 0);
        // c already sits at 2 after b takes 1.
        assert_eq!(moves(&shifts), [("b", 1), ("d", 3), ("old", 4)]);
        let legacy = shifts.iter().find(|s| s.id.as_str() == "old").unwrap();
        assert_eq!(legacy.from, None);
    }

    #[test]
    fn renumber_dense_partition_is_empty() {
        let entries = partition(&[("a", 1), ("b", 2), ("c", 3)]);
        assert!(plan_renumber(&entries, 1).is_empty());
    }

    #[test]
    fn reorder_below_base_record_inserts_it() {
        // A was stored at -1 in a base 0 partition: {(A,-1),(B,0),(C,1)}: A -> 0
        let others = partition(&[("b", 0), ("c", 1)]);
        let plan = plan_reorder(&others, Some(-1), Some(0), 0).unwrap();
        assert_eq!(plan.order, Some(0));
        assert_eq!(moves(&plan.shifts), [("b", 1), ("c", 2)]);

        let plan = plan_reorder(&others, Some(-1), Some(9), 0).unwrap();
        assert_eq!(plan.order, Some(2));
        assert!(plan.shifts.is_empty());
    }

    #[test]
    fn remove_below_base_shifts_nothing() {
        let remaining = partition(&[("b", 1), ("c", 2)]);
        assert!(plan_remove(&remaining, Some(0), 1).unwrap().is_empty());
    }

    #[test]
    fn unshiftable_order_fails_the_plan() {
        let entries = partition(&[("a", 0), ("big", i64::MAX)]);

        let err = plan_insert(&entries, None, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput(InvalidInputError::OrderOutOfRange { ref id, order })
                if id == "big" && order == i64::MAX
        ));

        assert!(plan_insert(&entries, Some(1), 0).is_err());
        assert!(plan_reorder(&entries[1..], Some(0), Some(5), 0).is_err());
    }

    #[test]
    fn renumber_repairs_unshiftable_order() {
        let entries = partition(&[("a", 0), ("big", i64::MAX)]);
        let shifts = plan_renumber(&entries, 0);
        assert_eq!(moves(&shifts), [("big", 1)]);
    }
}
