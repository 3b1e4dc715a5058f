//! Manual display ordering.
//!
//! Records in a collection are grouped into partitions by a configured
//! field. Within a partition the order field holds a dense sequence
//! `base, base+1, ...`. [`OrderedCollection`] maintains that sequence across
//! inserts, moves and removals; the planning functions it uses are exported
//! for callers that want to preview a change.

mod collection;
mod entry;
mod plan;
mod report;

pub use collection::OrderedCollection;
pub use entry::{Entry, display_cmp, sort_entries};
pub use plan::{
    InsertPlan, ReorderPlan, Shift, append_position, plan_insert, plan_remove, plan_renumber,
    plan_reorder,
};
pub use report::{DensityReport, RenumberReport};
