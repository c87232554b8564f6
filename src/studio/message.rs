//! # Studio Messages
//!
//! Requests processed by the [`StudioActor`](super::StudioActor). The first
//! group comes from [`StudioClient`](super::StudioClient); the `*Settled`
//! variants are sent by the actor's own background tasks when a network
//! call finishes, so the result is applied inside the actor loop like any
//! other event.

use super::error::StudioError;
use super::error_log::ScopedError;
use super::outcome::{ExpandOutcome, ReorderOutcome, SyncStatus};
use super::selection::{SelectTarget, Selection};
use crate::backend::ApiError;
use crate::model::{ItemKind, ListKey, Node, NodeId, NodeUpdate};
use crate::tree::{CourseTree, SiblingList};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the studio.
pub type Response<T> = oneshot::Sender<Result<T, StudioError>>;

#[derive(Debug)]
pub enum StudioRequest {
    Snapshot {
        respond_to: Response<Arc<CourseTree>>,
    },
    Reorder {
        kind: ItemKind,
        parent_id: NodeId,
        active_id: NodeId,
        over_id: NodeId,
        respond_to: Response<ReorderOutcome>,
    },
    Expand {
        id: NodeId,
        respond_to: Response<ExpandOutcome>,
    },
    Select {
        target: SelectTarget,
        respond_to: Response<Selection>,
    },
    CurrentSelection {
        respond_to: Response<Selection>,
    },
    UpdateNode {
        id: NodeId,
        update: NodeUpdate,
        respond_to: Response<()>,
    },
    Errors {
        respond_to: Response<Vec<ScopedError>>,
    },
    ClearErrors {
        respond_to: Response<()>,
    },
    ReorderSettled {
        key: ListKey,
        seq: u64,
        /// The order this request asked the backend to store.
        ordered: SiblingList,
        result: Result<(), ApiError>,
        notify: oneshot::Sender<SyncStatus>,
    },
    ExpandSettled {
        key: ListKey,
        result: Result<Vec<Node>, ApiError>,
    },
}
