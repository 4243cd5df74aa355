//! Order assignment for newly created items

use super::Ordered;

/// Order given to the first item of an empty scope
pub const BASE_ORDER: i32 = 1;

/// Order for an item appended to a scope holding `orders`
///
/// Returns `max + 1`, or [`BASE_ORDER`] when the scope is empty. Gaps left
/// by deletions are never reused. `None` when `max` is already `i32::MAX`.
pub fn next_order<I>(orders: I) -> Option<i32>
where
    I: IntoIterator<Item = i32>,
{
    match orders.into_iter().max() {
        Some(max) => max.checked_add(1),
        None => Some(BASE_ORDER),
    }
}

pub fn next_order_for<T: Ordered>(items: &[T]) -> Option<i32> {
    next_order(items.iter().map(|item| item.order()))
}
