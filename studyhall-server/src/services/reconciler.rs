//! Authoritative reorder commit
//!
//! A client submits the shift plan it computed against its own copy of the
//! scope. The plan is accepted only if it is exactly the plan the server
//! derives from its current state for the same gesture; otherwise the
//! client's view is stale and the commit is a conflict. Accepted plans are
//! written in one transaction.

use shared::ordering::{ReorderPlan, ShiftPlan, apply_plan, plan};
use shared::{AppError, AppResult, OrderedItem, ScopeKey};

use crate::services::ScopeService;
use crate::storage::{ItemStorage, StorageError};

#[derive(Clone, Debug)]
pub struct ServerReconciler {
    storage: ItemStorage,
    scopes: ScopeService,
}

impl ServerReconciler {
    pub fn new(storage: ItemStorage) -> Self {
        Self {
            scopes: ScopeService::new(storage.clone()),
            storage,
        }
    }

    /// Apply a client shift plan atomically
    ///
    /// Returns the scope's listing after the commit.
    ///
    /// | Failure | Code |
    /// |---------|------|
    /// | unknown scope | ScopeNotFound |
    /// | scope of another user | ScopeNotOwned |
    /// | malformed plan | InvalidPlan |
    /// | plan does not match current state | OrderConflict |
    pub fn commit(
        &self,
        scope: &ScopeKey,
        owner_id: &str,
        submitted: &ShiftPlan,
    ) -> AppResult<Vec<OrderedItem>> {
        self.scopes.authorize(scope, owner_id)?;
        submitted.validate()?;

        let txn = self.storage.begin_write()?;
        let mut items = self.storage.list_items_in(&txn, scope)?;

        if let Err(e) = verify_plan(&items, submitted) {
            tracing::warn!(scope = %scope, moved_id = submitted.moved_id, error = %e, "Reorder rejected");
            return Err(e);
        }

        let changes: Vec<(i64, i32)> = submitted
            .changes()
            .map(|(id, order)| (*id, order))
            .collect();
        self.storage.write_orders(&txn, scope, &changes)?;
        txn.commit().map_err(StorageError::from)?;

        apply_plan(&mut items, submitted);

        tracing::info!(
            scope = %scope,
            moved_id = submitted.moved_id,
            moved_order = submitted.moved_order,
            direction = ?submitted.direction,
            changed = changes.len(),
            "Reorder committed"
        );
        Ok(items)
    }
}

/// Check `submitted` against the plan the server computes for the same move
///
/// The target of the gesture is the item that currently holds
/// `moved_order`, since the moved item always takes the target's order.
fn verify_plan(current: &[OrderedItem], submitted: &ShiftPlan) -> AppResult<()> {
    if !current.iter().any(|item| item.id == submitted.moved_id) {
        return Err(AppError::order_conflict(format!(
            "Item {} is no longer in this scope",
            submitted.moved_id
        ))
        .with_detail("moved_id", submitted.moved_id));
    }

    let target = current
        .iter()
        .find(|item| item.order == submitted.moved_order)
        .ok_or_else(|| {
            AppError::order_conflict(format!(
                "No item currently holds order {}",
                submitted.moved_order
            ))
            .with_detail("moved_order", submitted.moved_order)
        })?;

    match plan(current, &submitted.moved_id, &target.id) {
        ReorderPlan::Move(expected) if expected.same_changes(submitted) => Ok(()),
        ReorderPlan::Move(expected) => Err(AppError::order_conflict(
            "Submitted orders no longer match the scope",
        )
        .with_detail("expected_shifted", expected.shifted.len())
        .with_detail("submitted_shifted", submitted.shifted.len())),
        ReorderPlan::NoOp => Err(AppError::order_conflict(format!(
            "Item {} already holds order {}",
            submitted.moved_id, submitted.moved_order
        ))),
    }
}
