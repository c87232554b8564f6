//! What the studio hands back for operations that finish in the background.

use crate::model::{ListKey, NodeId};
use crate::tree::IgnoreReason;
use tokio::sync::oneshot;

/// Final state of a persisted reorder.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    /// The backend accepted the order and the tree shows it.
    Committed,
    /// The backend rejected it and the list went back to the last order the
    /// backend confirmed.
    RolledBack { error: String },
    /// A newer reorder of the same list decides what the tree shows; this
    /// response left the tree alone.
    Superseded,
    /// The studio shut down before the response arrived.
    Abandoned,
}

/// Result of a reorder request, returned as soon as the optimistic update
/// has been applied.
#[derive(Debug)]
pub enum ReorderOutcome {
    Ignored(IgnoreReason),
    Pending(PendingReorder),
}

impl ReorderOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, ReorderOutcome::Ignored(_))
    }

    /// Waits for the backend; ignored requests settle as `None`.
    pub async fn settled(self) -> Option<SyncStatus> {
        match self {
            ReorderOutcome::Ignored(_) => None,
            ReorderOutcome::Pending(pending) => Some(pending.settled().await),
        }
    }
}

#[derive(Debug)]
pub struct PendingReorder {
    pub key: ListKey,
    pub seq: u64,
    /// The optimistic order now shown.
    pub ordered_ids: Vec<NodeId>,
    pub(crate) settled: oneshot::Receiver<SyncStatus>,
}

impl PendingReorder {
    pub async fn settled(self) -> SyncStatus {
        self.settled.await.unwrap_or(SyncStatus::Abandoned)
    }
}

/// Final state of a child fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Loaded { count: usize },
    Failed { error: String },
    Abandoned,
}

#[derive(Debug)]
pub enum ExpandOutcome {
    /// Children were already loaded; no fetch was issued.
    AlreadyLoaded { count: usize },
    Fetching(PendingFetch),
}

impl ExpandOutcome {
    /// Waits for the fetch, if any, and reports the final state.
    pub async fn settled(self) -> FetchStatus {
        match self {
            ExpandOutcome::AlreadyLoaded { count } => FetchStatus::Loaded { count },
            ExpandOutcome::Fetching(pending) => pending.settled().await,
        }
    }
}

#[derive(Debug)]
pub struct PendingFetch {
    pub key: ListKey,
    /// True when this call attached to a fetch already in flight instead of
    /// issuing a new one.
    pub joined: bool,
    pub(crate) settled: oneshot::Receiver<FetchStatus>,
}

impl PendingFetch {
    pub async fn settled(self) -> FetchStatus {
        self.settled.await.unwrap_or(FetchStatus::Abandoned)
    }
}
