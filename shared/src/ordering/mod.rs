//! Positional ordering engine
//!
//! Items in a scope carry an integer `order`; sorting by it reproduces the
//! visible sequence. This module holds the pieces both sides of the wire
//! need:
//!
//! - [`assign`] - order value for a newly created item (`max + 1`)
//! - [`plan`] - shift plan for a drag of one item onto another
//!
//! Everything here is pure: no store, no I/O.

pub mod assign;
pub mod plan;

use std::fmt::Debug;
use std::hash::Hash;

pub use assign::{BASE_ORDER, next_order, next_order_for};
pub use plan::{Direction, ReorderPlan, ShiftPlan, ShiftedItem, apply_plan, plan};

/// An entity that participates in a user-orderable collection
///
/// Implemented by [`crate::models::OrderedItem`]; client applications can
/// implement it for their own view models and reuse the planner and the
/// optimistic store unchanged.
pub trait Ordered {
    type Id: Clone + Eq + Hash + Debug;

    fn id(&self) -> &Self::Id;
    fn order(&self) -> i32;
    fn set_order(&mut self, order: i32);
}

/// Sort a collection into visible order
pub fn sort_by_order<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| item.order());
}

/// Check that orders are strictly increasing (sorted and duplicate-free)
pub fn is_strictly_ordered<T: Ordered>(items: &[T]) -> bool {
    items.windows(2).all(|w| w[0].order() < w[1].order())
}
