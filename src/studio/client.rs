//! # Studio Client
//!
//! The type-safe front door of a running [`StudioActor`](super::StudioActor).
//! Each method sends one request over the channel and awaits the one-shot
//! reply. The client only holds a sender, so cloning it is cheap; the studio
//! shuts down once every clone has been dropped.

use super::error::StudioError;
use super::error_log::ScopedError;
use super::message::{Response, StudioRequest};
use super::outcome::{ExpandOutcome, ReorderOutcome};
use super::selection::{SelectTarget, Selection};
use crate::model::{ItemKind, NodeId, NodeUpdate};
use crate::tree::CourseTree;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct StudioClient {
    sender: mpsc::Sender<StudioRequest>,
}

impl StudioClient {
    pub fn new(sender: mpsc::Sender<StudioRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StudioRequest,
    ) -> Result<T, StudioError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StudioError::ActorClosed)?;
        response.await.map_err(|_| StudioError::ActorDropped)?
    }

    /// The current tree. The snapshot never changes after it is returned.
    pub async fn snapshot(&self) -> Result<Arc<CourseTree>, StudioError> {
        self.request(|respond_to| StudioRequest::Snapshot { respond_to })
            .await
    }

    /// Handles a drag-end event: moves `active_id` to the position of
    /// `over_id` within the `kind` children of `parent_id`.
    ///
    /// Returns once the new order is visible in the tree; await
    /// [`ReorderOutcome::settled`] for the backend's verdict.
    #[instrument(skip(self))]
    pub async fn reorder(
        &self,
        kind: ItemKind,
        parent_id: NodeId,
        active_id: NodeId,
        over_id: NodeId,
    ) -> Result<ReorderOutcome, StudioError> {
        debug!("Sending request");
        self.request(|respond_to| StudioRequest::Reorder {
            kind,
            parent_id,
            active_id,
            over_id,
            respond_to,
        })
        .await
    }

    /// Reorders the paths of the course.
    pub async fn reorder_paths(
        &self,
        course_id: impl Into<NodeId>,
        active_id: impl Into<NodeId>,
        over_id: impl Into<NodeId>,
    ) -> Result<ReorderOutcome, StudioError> {
        self.reorder(ItemKind::Path, course_id.into(), active_id.into(), over_id.into())
            .await
    }

    /// Reorders the lessons of a path.
    pub async fn reorder_lessons(
        &self,
        path_id: impl Into<NodeId>,
        active_id: impl Into<NodeId>,
        over_id: impl Into<NodeId>,
    ) -> Result<ReorderOutcome, StudioError> {
        self.reorder(ItemKind::Lesson, path_id.into(), active_id.into(), over_id.into())
            .await
    }

    /// Reorders the sections of a lesson.
    pub async fn reorder_sections(
        &self,
        lesson_id: impl Into<NodeId>,
        active_id: impl Into<NodeId>,
        over_id: impl Into<NodeId>,
    ) -> Result<ReorderOutcome, StudioError> {
        self.reorder(ItemKind::Section, lesson_id.into(), active_id.into(), over_id.into())
            .await
    }

    /// Expands a path or lesson, fetching its children on first use.
    #[instrument(skip(self))]
    pub async fn expand(&self, id: NodeId) -> Result<ExpandOutcome, StudioError> {
        debug!("Sending request");
        self.request(|respond_to| StudioRequest::Expand { id, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn select(&self, target: SelectTarget) -> Result<Selection, StudioError> {
        self.request(|respond_to| StudioRequest::Select { target, respond_to })
            .await
    }

    pub async fn selection(&self) -> Result<Selection, StudioError> {
        self.request(|respond_to| StudioRequest::CurrentSelection { respond_to })
            .await
    }

    #[instrument(skip(self, update))]
    pub async fn update_node(&self, id: NodeId, update: NodeUpdate) -> Result<(), StudioError> {
        debug!(?update, "Sending request");
        self.request(|respond_to| StudioRequest::UpdateNode {
            id,
            update,
            respond_to,
        })
        .await
    }

    /// Failures of background reorders and fetches, oldest first.
    pub async fn errors(&self) -> Result<Vec<ScopedError>, StudioError> {
        self.request(|respond_to| StudioRequest::Errors { respond_to })
            .await
    }

    pub async fn clear_errors(&self) -> Result<(), StudioError> {
        self.request(|respond_to| StudioRequest::ClearErrors { respond_to })
            .await
    }
}
