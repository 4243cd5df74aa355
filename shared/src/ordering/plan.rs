//! Reorder planner
//!
//! Turns a drag gesture (`active` item dropped onto `over` item) into a
//! shift plan: the new order of the moved item plus the new order of every
//! item strictly between its old and new position.
//!
//! ```text
//! DOWN (active < over): items in (active, over] slide back:  order - 1
//! UP   (active > over): items in [over, active) slide on:    order + 1
//! moved item takes the original order of the item at `over`
//! ```
//!
//! The planner never touches items outside that window, so a move between
//! neighbours changes two rows and moving the first item to the end
//! changes every row once.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::Ordered;
use crate::error::AppError;

/// Direction of a move relative to the visible list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Towards the start of the list (smaller orders)
    Up,
    /// Towards the end of the list (larger orders)
    Down,
}

impl Direction {
    /// Order delta applied to every shifted item
    pub fn shift_delta(&self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// New order for one item displaced by a move
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftedItem<Id = i64> {
    pub id: Id,
    pub order: i32,
}

/// The order changes realising one reorder gesture
///
/// This is also the body of the reorder mutation on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPlan<Id = i64> {
    pub moved_id: Id,
    pub moved_order: i32,
    pub shifted: Vec<ShiftedItem<Id>>,
    pub direction: Direction,
}

/// Result of planning a gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderPlan<Id = i64> {
    /// Nothing to do: unknown id, or dropped onto itself
    NoOp,
    Move(ShiftPlan<Id>),
}

impl<Id> ReorderPlan<Id> {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    pub fn as_move(&self) -> Option<&ShiftPlan<Id>> {
        match self {
            Self::NoOp => None,
            Self::Move(plan) => Some(plan),
        }
    }

    pub fn into_move(self) -> Option<ShiftPlan<Id>> {
        match self {
            Self::NoOp => None,
            Self::Move(plan) => Some(plan),
        }
    }
}

/// Compute the shift plan for dropping `active_id` onto `over_id`
///
/// `items` must be sorted by order. Returns [`ReorderPlan::NoOp`] when
/// either id is missing or both resolve to the same position.
pub fn plan<T: Ordered>(items: &[T], active_id: &T::Id, over_id: &T::Id) -> ReorderPlan<T::Id> {
    let mut active_index = None;
    let mut over_index = None;
    for (index, item) in items.iter().enumerate() {
        if item.id() == active_id {
            active_index = Some(index);
        }
        if item.id() == over_id {
            over_index = Some(index);
        }
    }

    let (Some(active_index), Some(over_index)) = (active_index, over_index) else {
        return ReorderPlan::NoOp;
    };
    if active_index == over_index {
        return ReorderPlan::NoOp;
    }

    let (direction, window) = if active_index < over_index {
        (Direction::Down, &items[active_index + 1..=over_index])
    } else {
        (Direction::Up, &items[over_index..active_index])
    };

    let delta = direction.shift_delta();
    let shifted = window
        .iter()
        .map(|item| ShiftedItem {
            id: item.id().clone(),
            order: item.order() + delta,
        })
        .collect();

    ReorderPlan::Move(ShiftPlan {
        moved_id: active_id.clone(),
        moved_order: items[over_index].order(),
        shifted,
        direction,
    })
}

/// Rewrite orders according to `plan` and re-sort into visible order
///
/// Ids in the plan that are not in `items` are ignored. Returns how many
/// items had their order rewritten.
pub fn apply_plan<T: Ordered>(items: &mut [T], plan: &ShiftPlan<T::Id>) -> usize {
    let changes: HashMap<&T::Id, i32> = plan.changes().collect();

    let mut touched = 0;
    for item in items.iter_mut() {
        if let Some(&order) = changes.get(item.id()) {
            item.set_order(order);
            touched += 1;
        }
    }

    items.sort_by_key(|item| item.order());
    touched
}

impl<Id> ShiftPlan<Id>
where
    Id: Clone + Eq + std::hash::Hash + std::fmt::Debug,
{
    /// Every `(id, new order)` pair in the plan, moved item first
    pub fn changes(&self) -> impl Iterator<Item = (&Id, i32)> {
        std::iter::once((&self.moved_id, self.moved_order))
            .chain(self.shifted.iter().map(|s| (&s.id, s.order)))
    }

    /// Number of items whose order the plan rewrites
    pub fn change_count(&self) -> usize {
        self.shifted.len() + 1
    }

    /// Structural checks for a plan received from an untrusted source
    pub fn validate(&self) -> Result<(), AppError> {
        if self.shifted.is_empty() {
            return Err(AppError::invalid_plan("Plan shifts no items"));
        }

        let mut ids = HashSet::with_capacity(self.change_count());
        let mut orders = HashSet::with_capacity(self.change_count());
        for (id, order) in self.changes() {
            if !ids.insert(id) {
                return Err(AppError::invalid_plan(format!(
                    "Item {:?} appears more than once in the plan",
                    id
                )));
            }
            if !orders.insert(order) {
                return Err(AppError::invalid_plan(format!(
                    "Order {} is assigned more than once",
                    order
                )));
            }
        }

        let delta = self.direction.shift_delta();
        let wrong_side = self.shifted.iter().any(|s| match self.direction {
            // shifted items end up after the moved item on an UP move
            Direction::Up => s.order <= self.moved_order,
            Direction::Down => s.order >= self.moved_order,
        });
        if wrong_side {
            return Err(AppError::invalid_plan(format!(
                "Shifted orders are inconsistent with direction {:?} (delta {})",
                self.direction, delta
            )));
        }

        Ok(())
    }

    /// Compare two plans ignoring the order in which shifted items are listed
    pub fn same_changes(&self, other: &Self) -> bool {
        if self.moved_id != other.moved_id
            || self.moved_order != other.moved_order
            || self.direction != other.direction
            || self.shifted.len() != other.shifted.len()
        {
            return false;
        }
        let mine: HashSet<(&Id, i32)> = self.shifted.iter().map(|s| (&s.id, s.order)).collect();
        other.shifted.iter().all(|s| mine.contains(&(&s.id, s.order)))
    }
}
