//! Optimistic per-scope collections
//!
//! The store holds the last known list for each scope and is rewritten in
//! place when a reorder is applied, before the server has confirmed it.
//! Each mutation takes the write lock once, so a reader sees either the
//! whole pre-move list or the whole post-move list.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared::ordering::{self, Ordered, ReorderPlan};
use shared::ScopeKey;

/// Collection state captured before an optimistic mutation
///
/// Opaque: only [`OptimisticStore::restore`] consumes it.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    scope: ScopeKey,
    /// `None` when the scope was not loaded at capture time
    items: Option<Vec<T>>,
}

impl<T> Snapshot<T> {
    pub fn scope(&self) -> &ScopeKey {
        &self.scope
    }
}

/// Client-side cache of ordered collections keyed by scope
#[derive(Debug)]
pub struct OptimisticStore<T> {
    scopes: RwLock<HashMap<ScopeKey, Vec<T>>>,
}

impl<T> Default for OptimisticStore<T> {
    fn default() -> Self {
        Self {
            scopes: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Ordered + Clone> OptimisticStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current items of `scope` in visible order (empty when not loaded)
    pub fn get(&self, scope: &ScopeKey) -> Vec<T> {
        self.scopes.read().get(scope).cloned().unwrap_or_default()
    }

    pub fn contains(&self, scope: &ScopeKey) -> bool {
        self.scopes.read().contains_key(scope)
    }

    pub fn scopes(&self) -> Vec<ScopeKey> {
        self.scopes.read().keys().cloned().collect()
    }

    /// Install an authoritative list
    pub fn replace(&self, scope: &ScopeKey, mut items: Vec<T>) {
        ordering::sort_by_order(&mut items);
        self.scopes.write().insert(scope.clone(), items);
    }

    /// Install an authoritative list only if `allow` still holds once the
    /// write lock is held
    ///
    /// Returns whether the list was installed.
    pub fn replace_if(
        &self,
        scope: &ScopeKey,
        mut items: Vec<T>,
        allow: impl FnOnce() -> bool,
    ) -> bool {
        ordering::sort_by_order(&mut items);
        let mut scopes = self.scopes.write();
        if !allow() {
            return false;
        }
        scopes.insert(scope.clone(), items);
        true
    }

    pub fn remove(&self, scope: &ScopeKey) -> Option<Vec<T>> {
        self.scopes.write().remove(scope)
    }

    /// Rewrite orders per `plan` and re-sort
    ///
    /// `NoOp` leaves the collection untouched. Returns the number of items
    /// whose order was rewritten.
    pub fn apply_plan(&self, scope: &ScopeKey, plan: &ReorderPlan<T::Id>) -> usize {
        let Some(shift) = plan.as_move() else {
            return 0;
        };
        let mut scopes = self.scopes.write();
        match scopes.get_mut(scope) {
            Some(items) => ordering::apply_plan(items, shift),
            None => 0,
        }
    }

    pub fn snapshot(&self, scope: &ScopeKey) -> Snapshot<T> {
        Snapshot {
            scope: scope.clone(),
            items: self.scopes.read().get(scope).cloned(),
        }
    }

    /// Put the snapshot's collection back verbatim
    pub fn restore(&self, snapshot: Snapshot<T>) {
        let mut scopes = self.scopes.write();
        match snapshot.items {
            Some(items) => {
                scopes.insert(snapshot.scope, items);
            }
            None => {
                scopes.remove(&snapshot.scope);
            }
        }
    }

    /// Plan a move against the current list
    pub fn plan(
        &self,
        scope: &ScopeKey,
        active_id: &T::Id,
        over_id: &T::Id,
    ) -> ReorderPlan<T::Id> {
        match self.scopes.read().get(scope) {
            Some(items) => ordering::plan(items, active_id, over_id),
            None => ReorderPlan::NoOp,
        }
    }

    /// Snapshot, plan and apply under one write lock
    ///
    /// The plan is computed from the current (possibly already optimistic)
    /// list, so back-to-back moves compose.
    pub fn begin_move(
        &self,
        scope: &ScopeKey,
        active_id: &T::Id,
        over_id: &T::Id,
    ) -> (Snapshot<T>, ReorderPlan<T::Id>) {
        let mut scopes = self.scopes.write();
        let snapshot = Snapshot {
            scope: scope.clone(),
            items: scopes.get(scope).cloned(),
        };

        let plan = match scopes.get_mut(scope) {
            Some(items) => {
                let plan = ordering::plan(items, active_id, over_id);
                if let Some(shift) = plan.as_move() {
                    ordering::apply_plan(items, shift);
                }
                plan
            }
            None => ReorderPlan::NoOp,
        };

        (snapshot, plan)
    }

    /// Whether every id is present in the scope's current list
    pub fn contains_ids(&self, scope: &ScopeKey, ids: &[&T::Id]) -> bool {
        let scopes = self.scopes.read();
        let items = scopes.get(scope).map(Vec::as_slice).unwrap_or_default();
        ids.iter().all(|id| items.iter().any(|item| item.id() == *id))
    }
}
