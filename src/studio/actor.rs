//! # Studio Actor
//!
//! The `StudioActor` owns one course tree and processes every request for it
//! sequentially. It is the hierarchical reorder coordinator:
//!
//! * **Reorder**: the new sibling order is committed to the tree before the
//!   backend is contacted. The persistence call runs in a spawned task that
//!   reports back with `ReorderSettled`; on failure exactly that sibling list
//!   is restored and an error is logged.
//! * **Expand**: lessons of a path and sections of a lesson are fetched on
//!   first expansion only. A list is `Unloaded`, `Loading` or `Loaded`;
//!   expanding a `Loading` list joins the fetch already in flight.
//! * **Select / edit**: the editor selection and local field edits.
//!
//! ## Sequencing
//!
//! Each sibling list has a counter. Every persisted reorder takes the next
//! value. The list also remembers the last order the backend confirmed,
//! starting from the order it was loaded with. A failure of the newest
//! reorder restores that confirmed order; failures of older reorders are
//! dropped, so a slow failure can never roll back a newer order.
//!
//! A success always advances the confirmed order. If it belongs to an older
//! reorder and the newest one has already been rolled back, the tree adopts
//! it, since that is what the backend now holds.
//!
//! Tree mutation never awaits. The only suspension points are the network
//! calls, and those run outside the actor.

use super::client::StudioClient;
use super::error::StudioError;
use super::error_log::{ErrorLog, ErrorScope};
use super::message::StudioRequest;
use super::outcome::{
    ExpandOutcome, FetchStatus, PendingFetch, PendingReorder, ReorderOutcome, SyncStatus,
};
use super::selection::{SelectTarget, Selection};
use crate::backend::{fetch_children, ApiError, ReorderRequest, StudioContext};
use crate::model::{LazyList, ListKey, Node, NodeId, NodeUpdate};
use crate::tree::{move_item, plan_move, ChildState, CourseTree, IgnoreReason, SiblingList};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Persistence bookkeeping of one sibling list.
#[derive(Debug)]
struct ListSync {
    latest: u64,
    latest_settled: bool,
    confirmed: SiblingList,
    confirmed_seq: u64,
}

impl ListSync {
    fn new(confirmed: SiblingList) -> Self {
        Self {
            latest: 0,
            latest_settled: true,
            confirmed,
            confirmed_seq: 0,
        }
    }
}

/// What a settled reorder does to the tree.
enum Settle {
    Keep(SyncStatus),
    Restore(SiblingList, SyncStatus),
    RollBack(SiblingList, ApiError),
}

pub struct StudioActor {
    receiver: mpsc::Receiver<StudioRequest>,
    /// Lets background tasks report back without keeping the studio alive.
    loopback: mpsc::WeakSender<StudioRequest>,
    tree: Arc<CourseTree>,
    selection: Selection,
    syncs: HashMap<ListKey, ListSync>,
    fetch_waiters: HashMap<ListKey, Vec<oneshot::Sender<FetchStatus>>>,
    errors: ErrorLog,
}

impl StudioActor {
    /// Creates a new `StudioActor` for `tree` and its associated client.
    ///
    /// `buffer_size` is the capacity of the request channel.
    pub fn new(buffer_size: usize, tree: CourseTree) -> (Self, StudioClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            loopback: sender.downgrade(),
            selection: Selection::base_class(tree.course()),
            tree: Arc::new(tree),
            syncs: HashMap::new(),
            fetch_waiters: HashMap::new(),
            errors: ErrorLog::default(),
        };
        (actor, StudioClient::new(sender))
    }

    /// Runs the studio's event loop until every client has been dropped.
    pub async fn run(mut self, context: StudioContext) {
        let course_id = self.tree.course().id.clone();
        info!(%course_id, paths = self.path_count(), "Studio started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StudioRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.tree.clone()));
                }
                StudioRequest::Reorder {
                    kind,
                    parent_id,
                    active_id,
                    over_id,
                    respond_to,
                } => {
                    let key = ListKey::new(kind, parent_id);
                    let outcome = self.reorder(&context, key, &active_id, &over_id);
                    let _ = respond_to.send(Ok(outcome));
                }
                StudioRequest::Expand { id, respond_to } => {
                    let _ = respond_to.send(self.expand(&context, &id));
                }
                StudioRequest::Select { target, respond_to } => {
                    let _ = respond_to.send(self.select(&target));
                }
                StudioRequest::CurrentSelection { respond_to } => {
                    let _ = respond_to.send(Ok(self.selection.clone()));
                }
                StudioRequest::UpdateNode {
                    id,
                    update,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.update_node(&id, update));
                }
                StudioRequest::Errors { respond_to } => {
                    let _ = respond_to.send(Ok(self.errors.entries().to_vec()));
                }
                StudioRequest::ClearErrors { respond_to } => {
                    self.errors.clear();
                    let _ = respond_to.send(Ok(()));
                }
                StudioRequest::ReorderSettled {
                    key,
                    seq,
                    ordered,
                    result,
                    notify,
                } => {
                    let status = self.reorder_settled(&key, seq, ordered, result);
                    let _ = notify.send(status);
                }
                StudioRequest::ExpandSettled { key, result } => {
                    self.expand_settled(&key, result);
                }
            }
        }

        if !self.errors.is_empty() {
            warn!(errors = self.errors.len(), "Shutting down with unresolved errors");
        }
        info!(%course_id, nodes = self.tree.node_count(), "Shutdown");
    }

    fn path_count(&self) -> usize {
        self.tree
            .siblings(&self.tree.paths_key())
            .map_or(0, |list| list.len())
    }

    fn tree_mut(&mut self) -> &mut CourseTree {
        Arc::make_mut(&mut self.tree)
    }

    /// Issues the next sequence number for `key`. The first reorder of a
    /// list records `loaded` as its confirmed order.
    fn next_seq(&mut self, key: &ListKey, loaded: &SiblingList) -> u64 {
        let sync = self
            .syncs
            .entry(key.clone())
            .or_insert_with(|| ListSync::new(loaded.clone()));
        sync.latest += 1;
        sync.latest_settled = false;
        sync.latest
    }

    fn restore_list(&mut self, key: &ListKey, list: SiblingList) {
        if self.tree.siblings(key).is_some() {
            self.tree_mut().replace_list(key, list);
            self.selection.refresh(&self.tree);
        }
    }

    // -------------------------------------------------------------------------
    // Reorder
    // -------------------------------------------------------------------------

    fn reorder(
        &mut self,
        context: &StudioContext,
        key: ListKey,
        active_id: &NodeId,
        over_id: &NodeId,
    ) -> ReorderOutcome {
        let Some(previous) = self.tree.siblings(&key).cloned() else {
            debug!(%key, "Reorder ignored: list not loaded");
            return ReorderOutcome::Ignored(IgnoreReason::ListNotLoaded);
        };
        let (from, to) = match plan_move(&previous[..], active_id, over_id) {
            Ok(indices) => indices,
            Err(reason) => {
                debug!(%key, %active_id, %over_id, %reason, "Reorder ignored");
                return ReorderOutcome::Ignored(reason);
            }
        };

        let ordered_ids = move_item(&previous[..], from, to);
        let ordered: SiblingList = ordered_ids.clone().into();
        let seq = self.next_seq(&key, &previous);
        self.tree_mut().replace_list(&key, ordered.clone());
        self.selection.refresh(&self.tree);

        info!(%key, %active_id, from, to, seq, "Reorder applied");

        let request = ReorderRequest::new(&key, ordered_ids.clone());
        let (notify, settled) = oneshot::channel();
        let api = context.reorder.clone();
        let loopback = self.loopback.clone();
        let settled_key = key.clone();
        tokio::spawn(async move {
            let result = api.reorder_items(&request).await;
            if let Some(sender) = loopback.upgrade() {
                let _ = sender
                    .send(StudioRequest::ReorderSettled {
                        key: settled_key,
                        seq,
                        ordered,
                        result,
                        notify,
                    })
                    .await;
            }
        });

        ReorderOutcome::Pending(PendingReorder {
            key,
            seq,
            ordered_ids,
            settled,
        })
    }

    fn reorder_settled(
        &mut self,
        key: &ListKey,
        seq: u64,
        ordered: SiblingList,
        result: Result<(), ApiError>,
    ) -> SyncStatus {
        let Some(sync) = self.syncs.get_mut(key) else {
            return SyncStatus::Superseded;
        };
        let is_latest = seq == sync.latest;
        if is_latest {
            sync.latest_settled = true;
        }

        let settle = match result {
            Ok(()) => {
                if seq > sync.confirmed_seq {
                    sync.confirmed = ordered;
                    sync.confirmed_seq = seq;
                }
                if is_latest {
                    info!(%key, seq, "Reorder committed");
                    Settle::Keep(SyncStatus::Committed)
                } else if sync.latest_settled && sync.confirmed_seq == seq {
                    info!(%key, seq, latest = sync.latest, "Older reorder committed after newer rollback");
                    Settle::Restore(sync.confirmed.clone(), SyncStatus::Committed)
                } else {
                    debug!(%key, seq, latest = sync.latest, "Stale reorder success recorded");
                    Settle::Keep(SyncStatus::Superseded)
                }
            }
            Err(e) if is_latest => Settle::RollBack(sync.confirmed.clone(), e),
            Err(e) => {
                debug!(%key, seq, latest = sync.latest, error = %e, "Stale reorder failure discarded");
                Settle::Keep(SyncStatus::Superseded)
            }
        };

        match settle {
            Settle::Keep(status) => status,
            Settle::Restore(list, status) => {
                self.restore_list(key, list);
                status
            }
            Settle::RollBack(list, e) => {
                warn!(%key, seq, error = %e, "Reorder failed, rolling back");
                self.restore_list(key, list);
                let entry = self.errors.record(ErrorScope::Reorder(key.clone()), &e);
                SyncStatus::RolledBack {
                    error: entry.message.clone(),
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Expand
    // -------------------------------------------------------------------------

    fn expand(&mut self, context: &StudioContext, id: &NodeId) -> Result<ExpandOutcome, StudioError> {
        let list = self.tree.lazy_list(id)?;
        let key = list.key();

        let joined = match self.tree.child_state(&key) {
            ChildState::Loaded(list) => {
                debug!(%key, count = list.len(), "Already loaded");
                return Ok(ExpandOutcome::AlreadyLoaded { count: list.len() });
            }
            ChildState::Loading => true,
            ChildState::Unloaded => false,
        };

        let (notify, settled) = oneshot::channel();
        self.fetch_waiters.entry(key.clone()).or_default().push(notify);

        if joined {
            debug!(%key, "Joining fetch in flight");
        } else {
            self.tree_mut().mark_loading(&key);
            info!(%key, "Fetching children");
            self.spawn_fetch(context, list);
        }

        Ok(ExpandOutcome::Fetching(PendingFetch {
            key,
            joined,
            settled,
        }))
    }

    fn spawn_fetch(&self, context: &StudioContext, list: LazyList) {
        let catalog = context.catalog.clone();
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            let result = fetch_children(catalog.as_ref(), &list).await;
            if let Some(sender) = loopback.upgrade() {
                let _ = sender
                    .send(StudioRequest::ExpandSettled {
                        key: list.key(),
                        result,
                    })
                    .await;
            }
        });
    }

    fn expand_settled(&mut self, key: &ListKey, result: Result<Vec<Node>, ApiError>) {
        let status = match result {
            Ok(children) => {
                let count = children.len();
                self.tree_mut().splice_children(key, children);
                info!(%key, count, "Children loaded");
                FetchStatus::Loaded { count }
            }
            Err(e) => {
                warn!(%key, error = %e, "Fetch failed");
                self.tree_mut().mark_unloaded(key);
                let entry = self.errors.record(ErrorScope::Expand(key.clone()), &e);
                FetchStatus::Failed {
                    error: entry.message.clone(),
                }
            }
        };

        for waiter in self.fetch_waiters.remove(key).unwrap_or_default() {
            let _ = waiter.send(status.clone());
        }
    }

    // -------------------------------------------------------------------------
    // Selection & edits
    // -------------------------------------------------------------------------

    fn select(&mut self, target: &SelectTarget) -> Result<Selection, StudioError> {
        let selection = Selection::resolve(&self.tree, target)?;
        debug!(kind = selection.type_label(), id = %selection.id, "Selected");
        self.selection = selection.clone();
        Ok(selection)
    }

    fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> Result<(), StudioError> {
        debug!(%id, ?update, "Update");
        self.tree_mut().update_node(id, update)?;
        self.selection.refresh(&self.tree);
        info!(%id, "Updated");
        Ok(())
    }
}
