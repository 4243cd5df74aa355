//! Reorder lifecycle
//!
//! A reorder goes `Start -> Pending -> Committed | Aborted`:
//!
//! 1. in-flight reads for the scope are cancelled
//! 2. the plan is computed and applied to the [`OptimisticStore`] in one step
//! 3. the plan is sent to the [`Reconciler`]
//! 4. on failure the snapshot is restored and the [`ErrorSink`] notified
//! 5. either way the scope is refetched
//!
//! While any reorder on a scope is pending, refetch results for that scope
//! are discarded so they cannot overwrite the optimistic list.
//!
//! Moves that overlap in time are kept per scope in start order. A later
//! move's snapshot already contains every earlier optimistic move, so when a
//! move aborts, each later move inherits the aborted move's snapshot as its
//! rollback base.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use shared::ScopeKey;
use shared::ordering::{Ordered, ShiftPlan};
use tokio_util::sync::CancellationToken;

use crate::notify::{ErrorSink, TracingErrorSink};
use crate::store::{OptimisticStore, Snapshot};
use crate::{ClientResult, ReorderError};

/// Server-side operations the coordinator needs
#[async_trait]
pub trait Reconciler<T>: Send + Sync
where
    T: Ordered + Send + 'static,
    T::Id: Send + Sync,
{
    /// Authoritative listing of a scope
    async fn list_items(&self, scope: &ScopeKey) -> ClientResult<Vec<T>>;

    /// Persist a shift plan atomically
    async fn commit(&self, scope: &ScopeKey, plan: &ShiftPlan<T::Id>) -> ClientResult<()>;

    async fn create_item(&self, scope: &ScopeKey, title: &str) -> ClientResult<T>;
}

/// How a reorder settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome<Id> {
    /// Dropped onto itself or the scope is not loaded; nothing was sent
    Unchanged,
    /// The server accepted this plan
    Committed(ShiftPlan<Id>),
}

/// What happened to a refetched listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The listing replaced the local collection
    Applied,
    /// Superseded by a reorder, or a reorder was pending when it arrived
    Discarded,
}

/// Drives reorders and refetches for every scope of one client
pub struct SyncCoordinator<T, R> {
    store: Arc<OptimisticStore<T>>,
    reconciler: Arc<R>,
    sink: Arc<dyn ErrorSink>,
    /// In-flight read per scope, tagged with its sequence number
    reads: DashMap<ScopeKey, (u64, CancellationToken)>,
    read_seq: AtomicU64,
    /// Number of unsettled reorders per scope
    pending: DashMap<ScopeKey, usize>,
    /// Unsettled moves per scope in the order they were applied
    inflight: DashMap<ScopeKey, Vec<InflightMove<T>>>,
    move_seq: AtomicU64,
    /// Scopes whose last refetch failed
    stale: DashSet<ScopeKey>,
}

impl<T, R> SyncCoordinator<T, R>
where
    T: Ordered + Clone + Send + Sync + 'static,
    T::Id: Send + Sync,
    R: Reconciler<T>,
{
    pub fn new(reconciler: Arc<R>) -> Self {
        Self {
            store: Arc::new(OptimisticStore::new()),
            reconciler,
            sink: Arc::new(TracingErrorSink),
            reads: DashMap::new(),
            read_seq: AtomicU64::new(0),
            pending: DashMap::new(),
            inflight: DashMap::new(),
            move_seq: AtomicU64::new(0),
            stale: DashSet::new(),
        }
    }

    /// Share an existing store (e.g. one the UI already renders from)
    pub fn with_store(mut self, store: Arc<OptimisticStore<T>>) -> Self {
        self.store = store;
        self
    }

    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn store(&self) -> &Arc<OptimisticStore<T>> {
        &self.store
    }

    pub fn reconciler(&self) -> &Arc<R> {
        &self.reconciler
    }

    /// Whether the last refetch of `scope` failed
    pub fn is_stale(&self, scope: &ScopeKey) -> bool {
        self.stale.contains(scope)
    }

    pub fn has_pending(&self, scope: &ScopeKey) -> bool {
        self.pending.get(scope).is_some_and(|count| *count > 0)
    }

    /// Move `active_id` to the position of `over_id`
    ///
    /// The store reflects the move before this returns control to the
    /// runtime for the first time. On error the store has already been
    /// rolled back and the sink notified; the error is returned for callers
    /// that want to react further. Failed commits are not retried.
    pub async fn reorder(
        &self,
        scope: &ScopeKey,
        active_id: &T::Id,
        over_id: &T::Id,
    ) -> Result<ReorderOutcome<T::Id>, ReorderError> {
        if self.store.contains(scope) && !self.store.contains_ids(scope, &[active_id, over_id]) {
            let err = ReorderError::Validation(format!(
                "{:?} or {:?} is not in {}",
                active_id, over_id, scope
            ));
            tracing::warn!(scope = %scope, error = %err, "Reorder rejected");
            self.sink.notify_error(&err.to_string());
            return Err(err);
        }

        let guard = PendingGuard::new(&self.pending, scope);
        self.cancel_reads(scope);

        let move_id = self.move_seq.fetch_add(1, AtomicOrdering::Relaxed);
        let Some(shift) = self.begin_tracked_move(scope, move_id, active_id, over_id) else {
            tracing::debug!(scope = %scope, "Reorder is a no-op");
            return Ok(ReorderOutcome::Unchanged);
        };
        tracing::debug!(
            scope = %scope,
            moved = ?shift.moved_id,
            moved_order = shift.moved_order,
            direction = ?shift.direction,
            shifted = shift.shifted.len(),
            "Optimistic reorder applied"
        );

        let result = self.reconciler.commit(scope, &shift).await;

        // the guard outlives the rollback so no refetch lands in between
        match result {
            Ok(()) => {
                tracing::debug!(scope = %scope, moved = ?shift.moved_id, "Reorder committed");
                self.settle(scope, move_id, false);
                drop(guard);
                self.invalidate(scope).await;
                Ok(ReorderOutcome::Committed(shift))
            }
            Err(e) => {
                let err = ReorderError::from(e);
                tracing::warn!(scope = %scope, error = %err, "Reorder failed, rolling back");
                self.settle(scope, move_id, true);
                self.sink.notify_error(&err.to_string());
                drop(guard);
                self.invalidate(scope).await;
                Err(err)
            }
        }
    }

    /// Apply the move and record its rollback base
    ///
    /// The scope's in-flight entry is held across the store mutation so the
    /// recorded order matches the order moves were applied in.
    fn begin_tracked_move(
        &self,
        scope: &ScopeKey,
        move_id: u64,
        active_id: &T::Id,
        over_id: &T::Id,
    ) -> Option<ShiftPlan<T::Id>> {
        let mut moves = self.inflight.entry(scope.clone()).or_default();
        let (base, plan) = self.store.begin_move(scope, active_id, over_id);
        let shift = plan.into_move()?;
        moves.push(InflightMove { id: move_id, base });
        Some(shift)
    }

    /// Forget a settled move; when it aborted, roll the store back
    fn settle(&self, scope: &ScopeKey, move_id: u64, aborted: bool) {
        let mut moves = self.inflight.entry(scope.clone()).or_default();
        let Some(index) = moves.iter().position(|m| m.id == move_id) else {
            return;
        };
        let settled = moves.remove(index);

        if aborted {
            for later in moves.iter_mut().skip(index) {
                later.base = settled.base.clone();
            }
            self.store.restore(settled.base);
        }

        let empty = moves.is_empty();
        drop(moves);
        if empty {
            self.inflight.remove_if(scope, |_, moves| moves.is_empty());
        }
    }

    /// Fetch the authoritative listing and install it
    ///
    /// A newer refresh or a reorder on the same scope cancels this one.
    pub async fn refresh(&self, scope: &ScopeKey) -> ClientResult<RefreshOutcome> {
        let seq = self.read_seq.fetch_add(1, AtomicOrdering::Relaxed);
        let token = CancellationToken::new();
        if let Some((_, previous)) = self.reads.insert(scope.clone(), (seq, token.clone())) {
            previous.cancel();
        }

        let result = tokio::select! {
            _ = token.cancelled() => None,
            result = self.reconciler.list_items(scope) => Some(result),
        };
        self.reads.remove_if(scope, |_, (current, _)| *current == seq);

        let items = match result {
            None => {
                tracing::debug!(scope = %scope, "Read cancelled");
                return Ok(RefreshOutcome::Discarded);
            }
            Some(Err(e)) => {
                self.stale.insert(scope.clone());
                return Err(e);
            }
            Some(Ok(items)) => items,
        };

        let installed = self.store.replace_if(scope, items, || {
            !token.is_cancelled() && !self.has_pending(scope)
        });
        if installed {
            self.stale.remove(scope);
            Ok(RefreshOutcome::Applied)
        } else {
            tracing::debug!(scope = %scope, "Listing arrived during a reorder, discarded");
            Ok(RefreshOutcome::Discarded)
        }
    }

    /// Create an item at the end of the scope, then refetch
    pub async fn create(&self, scope: &ScopeKey, title: &str) -> ClientResult<T> {
        let item = self.reconciler.create_item(scope, title).await?;
        self.invalidate(scope).await;
        Ok(item)
    }

    /// Cancel any in-flight read of `scope`
    pub fn cancel_reads(&self, scope: &ScopeKey) {
        if let Some((_, (_, token))) = self.reads.remove(scope) {
            token.cancel();
            tracing::debug!(scope = %scope, "In-flight read cancelled");
        }
    }

    /// Refetch after a settled mutation; a failure only marks the scope stale
    async fn invalidate(&self, scope: &ScopeKey) {
        if let Err(e) = self.refresh(scope).await {
            tracing::warn!(scope = %scope, error = %e, "Refetch failed, scope is stale");
        }
    }
}

impl<T, R> std::fmt::Debug for SyncCoordinator<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("pending", &self.pending.len())
            .field("inflight", &self.inflight.len())
            .field("reads", &self.reads.len())
            .field("stale", &self.stale.len())
            .finish_non_exhaustive()
    }
}

/// A move applied locally and not yet confirmed or rejected
struct InflightMove<T> {
    id: u64,
    base: Snapshot<T>,
}

/// Counts a reorder as pending for as long as it lives
struct PendingGuard<'a> {
    pending: &'a DashMap<ScopeKey, usize>,
    scope: ScopeKey,
}

impl<'a> PendingGuard<'a> {
    fn new(pending: &'a DashMap<ScopeKey, usize>, scope: &ScopeKey) -> Self {
        *pending.entry(scope.clone()).or_insert(0) += 1;
        Self {
            pending,
            scope: scope.clone(),
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove_if_mut(&self.scope, |_, count| {
            *count = count.saturating_sub(1);
            *count == 0
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering::SeqCst};
    use std::sync::{OnceLock, Weak};

    use parking_lot::Mutex;
    use shared::ordering::{self, next_order};
    use shared::{AppError, ErrorCode, OrderedItem};
    use tokio::sync::Notify;

    use super::*;
    use crate::ClientError;

    fn scope() -> ScopeKey {
        ScopeKey::notes("folder-1").unwrap()
    }

    fn items(titles: &[&str]) -> Vec<OrderedItem> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| OrderedItem {
                id: i as i64 + 1,
                scope: scope(),
                order: i as i32 + 1,
                title: title.to_string(),
                created_at: 0,
                updated_at: 0,
            })
            .collect()
    }

    /// In-memory server with switches for failure and gates for timing
    #[derive(Default)]
    struct FakeServer {
        items: Mutex<Vec<OrderedItem>>,
        fail_commit: Mutex<Option<ErrorCode>>,
        fail_every_commit: AtomicBool,
        fail_list: AtomicBool,
        /// One gate per upcoming commit, in call order
        commit_gates: Mutex<VecDeque<Arc<Notify>>>,
        list_gate: Mutex<Option<Arc<Notify>>>,
        commits: AtomicUsize,
        lists: AtomicUsize,
    }

    impl FakeServer {
        fn with(titles: &[&str]) -> Arc<Self> {
            let server = Self::default();
            *server.items.lock() = items(titles);
            Arc::new(server)
        }

        fn titles(&self) -> Vec<String> {
            let mut items = self.items.lock().clone();
            ordering::sort_by_order(&mut items);
            items.into_iter().map(|i| i.title).collect()
        }

        fn gate_commit(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.commit_gates.lock().push_back(gate.clone());
            gate
        }

        fn gate_list(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.list_gate.lock() = Some(gate.clone());
            gate
        }
    }

    #[async_trait]
    impl Reconciler<OrderedItem> for FakeServer {
        async fn list_items(&self, _scope: &ScopeKey) -> ClientResult<Vec<OrderedItem>> {
            self.lists.fetch_add(1, SeqCst);
            let gate = self.list_gate.lock().take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if self.fail_list.load(SeqCst) {
                return Err(ClientError::Internal("offline".into()));
            }
            Ok(self.items.lock().clone())
        }

        async fn commit(&self, _scope: &ScopeKey, plan: &ShiftPlan<i64>) -> ClientResult<()> {
            self.commits.fetch_add(1, SeqCst);
            let gate = self.commit_gates.lock().pop_front();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if let Some(code) = self.fail_commit.lock().take() {
                return Err(AppError::new(code).into());
            }
            if self.fail_every_commit.load(SeqCst) {
                return Err(AppError::new(ErrorCode::DatabaseError).into());
            }
            ordering::apply_plan(&mut self.items.lock(), plan);
            Ok(())
        }

        async fn create_item(&self, scope: &ScopeKey, title: &str) -> ClientResult<OrderedItem> {
            let mut items = self.items.lock();
            let item = OrderedItem {
                id: items.iter().map(|i| i.id).max().unwrap_or(0) + 1,
                scope: scope.clone(),
                order: next_order(items.iter().map(|i| i.order)).unwrap(),
                title: title.to_string(),
                created_at: 0,
                updated_at: 0,
            };
            items.push(item.clone());
            Ok(item)
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        messages: Mutex<Vec<String>>,
    }

    impl ErrorSink for CollectingSink {
        fn notify_error(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }

    type Coordinator = SyncCoordinator<OrderedItem, FakeServer>;

    /// Records the coordinator's state at the moment an error surfaces
    #[derive(Default)]
    struct ObservingSink {
        sync: OnceLock<Weak<Coordinator>>,
        seen: Mutex<Vec<(bool, Vec<String>)>>,
    }

    impl ErrorSink for ObservingSink {
        fn notify_error(&self, _message: &str) {
            if let Some(sync) = self.sync.get().and_then(Weak::upgrade) {
                let pending = sync.has_pending(&scope());
                self.seen.lock().push((pending, visible(&sync)));
            }
        }
    }

    async fn loaded(server: &Arc<FakeServer>) -> (Arc<Coordinator>, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::default());
        let sync: Coordinator =
            SyncCoordinator::new(server.clone()).with_error_sink(sink.clone());
        assert_eq!(sync.refresh(&scope()).await.unwrap(), RefreshOutcome::Applied);
        (Arc::new(sync), sink)
    }

    fn visible(sync: &Coordinator) -> Vec<String> {
        sync.store().get(&scope()).into_iter().map(|i| i.title).collect()
    }

    async fn wait_for(counter: &AtomicUsize, n: usize) {
        while counter.load(SeqCst) < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_reorder_commits_and_refetches() {
        let server = FakeServer::with(&["A", "B", "C", "D", "E"]);
        let (sync, sink) = loaded(&server).await;

        let outcome = sync.reorder(&scope(), &4, &2).await.unwrap();
        let ReorderOutcome::Committed(plan) = outcome else {
            panic!("expected a committed plan");
        };
        assert_eq!(plan.moved_order, 2);
        assert_eq!(plan.shifted.len(), 2);

        assert_eq!(visible(&sync), ["A", "D", "B", "C", "E"]);
        assert_eq!(server.titles(), ["A", "D", "B", "C", "E"]);
        assert_eq!(server.lists.load(SeqCst), 2);
        assert!(!sync.has_pending(&scope()));
        assert!(sink.messages.lock().is_empty());
    }

    #[tokio::test]
    async fn test_drop_on_itself_sends_nothing() {
        let server = FakeServer::with(&["A", "B", "C"]);
        let (sync, _sink) = loaded(&server).await;

        let outcome = sync.reorder(&scope(), &2, &2).await.unwrap();
        assert_eq!(outcome, ReorderOutcome::Unchanged);
        assert_eq!(server.commits.load(SeqCst), 0);
        assert_eq!(visible(&sync), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_unloaded_scope_is_unchanged() {
        let server = FakeServer::with(&["A", "B"]);
        let sync: Coordinator = SyncCoordinator::new(server.clone());

        let outcome = sync.reorder(&scope(), &1, &2).await.unwrap();
        assert_eq!(outcome, ReorderOutcome::Unchanged);
        assert_eq!(server.commits.load(SeqCst), 0);
    }

    #[tokio::test]
    async fn test_conflict_rolls_back_to_server_order() {
        let server = FakeServer::with(&["A", "B", "C"]);
        let (sync, sink) = loaded(&server).await;
        *server.fail_commit.lock() = Some(ErrorCode::OrderConflict);

        let err = sync.reorder(&scope(), &3, &1).await.unwrap_err();
        assert!(matches!(err, ReorderError::Conflict(_)));
        assert_eq!(visible(&sync), ["A", "B", "C"]);
        assert_eq!(sink.messages.lock().len(), 1);
        assert!(!sync.is_stale(&scope()));
    }

    #[tokio::test]
    async fn test_failed_commit_restores_exact_snapshot() {
        let server = FakeServer::with(&["A", "B", "C", "D"]);
        let (sync, _sink) = loaded(&server).await;
        let before = sync.store().get(&scope());

        // the refetch fails too, so only the rollback is observed
        *server.fail_commit.lock() = Some(ErrorCode::DatabaseError);
        server.fail_list.store(true, SeqCst);

        let err = sync.reorder(&scope(), &1, &4).await.unwrap_err();
        assert!(matches!(err, ReorderError::Transport(_)));
        assert_eq!(sync.store().get(&scope()), before);
        assert!(sync.is_stale(&scope()));
    }

    #[tokio::test]
    async fn test_foreign_scope_is_auth_error() {
        let server = FakeServer::with(&["A", "B"]);
        let (sync, sink) = loaded(&server).await;
        *server.fail_commit.lock() = Some(ErrorCode::ScopeNotOwned);

        let err = sync.reorder(&scope(), &2, &1).await.unwrap_err();
        assert!(matches!(err, ReorderError::Auth(_)));
        assert_eq!(visible(&sync), ["A", "B"]);
        assert_eq!(sink.messages.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_item_rejected_before_mutation() {
        let server = FakeServer::with(&["A", "B", "C"]);
        let (sync, sink) = loaded(&server).await;

        let err = sync.reorder(&scope(), &1, &99).await.unwrap_err();
        assert!(matches!(err, ReorderError::Validation(_)));
        assert_eq!(visible(&sync), ["A", "B", "C"]);
        assert_eq!(server.commits.load(SeqCst), 0);
        assert_eq!(sink.messages.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_reorder_cancels_in_flight_read() {
        let server = FakeServer::with(&["A", "B", "C"]);
        let (sync, _sink) = loaded(&server).await;
        let _gate = server.gate_list();

        let reader = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.refresh(&scope()).await })
        };
        wait_for(&server.lists, 2).await;

        sync.reorder(&scope(), &3, &1).await.unwrap();

        let outcome = reader.await.unwrap().unwrap();
        assert_eq!(outcome, RefreshOutcome::Discarded);
        assert_eq!(visible(&sync), ["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_listing_during_pending_reorder_is_discarded() {
        let server = FakeServer::with(&["A", "B", "C"]);
        let (sync, _sink) = loaded(&server).await;
        let gate = server.gate_commit();

        let writer = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.reorder(&scope(), &3, &1).await })
        };
        wait_for(&server.commits, 1).await;
        assert!(sync.has_pending(&scope()));

        // server still has the old order; installing it would undo the move
        let outcome = sync.refresh(&scope()).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Discarded);
        assert_eq!(visible(&sync), ["C", "A", "B"]);

        gate.notify_one();
        let outcome = writer.await.unwrap().unwrap();
        assert!(matches!(outcome, ReorderOutcome::Committed(_)));
        assert_eq!(visible(&sync), ["C", "A", "B"]);
        assert!(!sync.has_pending(&scope()));
    }

    #[tokio::test]
    async fn test_quick_reorders_plan_against_optimistic_state() {
        let server = FakeServer::with(&["A", "B", "C", "D", "E"]);
        let (sync, _sink) = loaded(&server).await;
        let gate = server.gate_commit();

        let first = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.reorder(&scope(), &4, &2).await })
        };
        wait_for(&server.commits, 1).await;
        assert_eq!(visible(&sync), ["A", "D", "B", "C", "E"]);

        // E onto A while D onto B is still unconfirmed
        let second = sync.reorder(&scope(), &5, &1).await.unwrap();
        let ReorderOutcome::Committed(plan) = second else {
            panic!("expected a committed plan");
        };
        let d_shift = plan.shifted.iter().find(|s| s.id == 4).unwrap();
        assert_eq!(d_shift.order, 3);
        // the refetch after the second move saw a pending first move
        assert_eq!(visible(&sync), ["E", "A", "D", "B", "C"]);

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert!(!sync.has_pending(&scope()));
    }

    /// Two overlapping moves, both rejected while the listing is unreachable
    async fn fail_overlapping_moves(release_first_move_first: bool) -> Arc<Coordinator> {
        let server = FakeServer::with(&["A", "B", "C", "D", "E"]);
        let (sync, sink) = loaded(&server).await;
        let first_gate = server.gate_commit();
        let second_gate = server.gate_commit();
        server.fail_every_commit.store(true, SeqCst);
        server.fail_list.store(true, SeqCst);

        let first = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.reorder(&scope(), &4, &2).await })
        };
        wait_for(&server.commits, 1).await;
        let second = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.reorder(&scope(), &5, &1).await })
        };
        wait_for(&server.commits, 2).await;
        assert_eq!(visible(&sync), ["E", "A", "D", "B", "C"]);

        let (early_gate, early, late_gate, late) = if release_first_move_first {
            (first_gate, first, second_gate, second)
        } else {
            (second_gate, second, first_gate, first)
        };
        early_gate.notify_one();
        assert!(matches!(early.await.unwrap(), Err(ReorderError::Transport(_))));
        late_gate.notify_one();
        assert!(matches!(late.await.unwrap(), Err(ReorderError::Transport(_))));

        assert_eq!(sink.messages.lock().len(), 2);
        assert!(!sync.has_pending(&scope()));
        assert!(sync.is_stale(&scope()));
        sync
    }

    #[tokio::test]
    async fn test_overlapping_moves_failing_oldest_first_restore_original() {
        let sync = fail_overlapping_moves(true).await;
        assert_eq!(visible(&sync), ["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn test_overlapping_moves_failing_newest_first_restore_original() {
        let sync = fail_overlapping_moves(false).await;
        assert_eq!(visible(&sync), ["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn test_rollback_happens_while_reorder_is_still_pending() {
        let server = FakeServer::with(&["A", "B", "C"]);
        let sink = Arc::new(ObservingSink::default());
        let sync: Arc<Coordinator> = Arc::new(
            SyncCoordinator::new(server.clone()).with_error_sink(sink.clone()),
        );
        sink.sync.set(Arc::downgrade(&sync)).ok();
        sync.refresh(&scope()).await.unwrap();
        *server.fail_commit.lock() = Some(ErrorCode::OrderConflict);

        sync.reorder(&scope(), &3, &1).await.unwrap_err();

        // a refetch could only land after the pending count drops, and by
        // then the store already shows the restored list
        let seen = sink.seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0);
        assert_eq!(seen[0].1, ["A", "B", "C"]);
        assert!(!sync.has_pending(&scope()));
    }

    #[tokio::test]
    async fn test_newer_refresh_supersedes_older() {
        let server = FakeServer::with(&["A", "B"]);
        let (sync, _sink) = loaded(&server).await;
        let _gate = server.gate_list();

        let older = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.refresh(&scope()).await })
        };
        wait_for(&server.lists, 2).await;

        assert_eq!(sync.refresh(&scope()).await.unwrap(), RefreshOutcome::Applied);
        assert_eq!(older.await.unwrap().unwrap(), RefreshOutcome::Discarded);
    }

    #[tokio::test]
    async fn test_failed_refresh_marks_stale_until_recovery() {
        let server = FakeServer::with(&["A"]);
        let (sync, _sink) = loaded(&server).await;

        server.fail_list.store(true, SeqCst);
        assert!(sync.refresh(&scope()).await.is_err());
        assert!(sync.is_stale(&scope()));
        assert_eq!(visible(&sync), ["A"]);

        server.fail_list.store(false, SeqCst);
        assert_eq!(sync.refresh(&scope()).await.unwrap(), RefreshOutcome::Applied);
        assert!(!sync.is_stale(&scope()));
    }

    #[tokio::test]
    async fn test_create_appends_and_refetches() {
        let server = FakeServer::with(&["A", "B"]);
        let (sync, _sink) = loaded(&server).await;

        let item = sync.create(&scope(), "C").await.unwrap();
        assert_eq!(item.order, 3);
        assert_eq!(visible(&sync), ["A", "B", "C"]);
    }
}
