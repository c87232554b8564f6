//! # Backend Contracts
//!
//! The studio never talks to the database directly. It consumes two narrow
//! services: [`ReorderApi`] persists a new sibling order, [`CatalogApi`]
//! loads the course and lazily loads children. Both are injected into the
//! studio actor at `run()` time through a [`StudioContext`].
use crate::model::{CourseOutline, ItemKind, LazyList, Lesson, ListKey, Node, NodeId, Section};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Errors returned by backend implementations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be understood.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The addressed parent does not exist on the backend.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The configured API root is not an absolute URL.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Body of `POST /reorder-items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub item_type: ItemKind,
    pub ordered_ids: Vec<NodeId>,
    pub parent_id: NodeId,
}

impl ReorderRequest {
    pub fn new(key: &ListKey, ordered_ids: Vec<NodeId>) -> Self {
        Self {
            item_type: key.kind,
            ordered_ids,
            parent_id: key.parent_id.clone(),
        }
    }
}

/// Error body returned by the backend on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Persists the order of one sibling list.
#[async_trait]
pub trait ReorderApi: Send + Sync {
    async fn reorder_items(&self, request: &ReorderRequest) -> Result<(), ApiError>;
}

/// Read-only access to the course tree.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Loads the course with its paths, ordered by `order_index`.
    async fn load_course(&self, course_id: &NodeId) -> Result<CourseOutline, ApiError>;

    /// Lesson summaries of a path, without their sections.
    async fn fetch_lessons(&self, path_id: &NodeId) -> Result<Vec<Lesson>, ApiError>;

    async fn fetch_sections(&self, lesson_id: &NodeId) -> Result<Vec<Section>, ApiError>;
}

/// Fetches the lessons or sections of `list` as tree nodes.
pub async fn fetch_children(catalog: &dyn CatalogApi, list: &LazyList) -> Result<Vec<Node>, ApiError> {
    let children = match list {
        LazyList::Lessons(path_id) => catalog
            .fetch_lessons(path_id)
            .await?
            .into_iter()
            .map(Node::Lesson)
            .collect(),
        LazyList::Sections(lesson_id) => catalog
            .fetch_sections(lesson_id)
            .await?
            .into_iter()
            .map(Node::Section)
            .collect(),
    };
    Ok(children)
}

/// Dependencies injected into the studio actor.
#[derive(Clone)]
pub struct StudioContext {
    pub reorder: Arc<dyn ReorderApi>,
    pub catalog: Arc<dyn CatalogApi>,
}

impl StudioContext {
    pub fn new(reorder: Arc<dyn ReorderApi>, catalog: Arc<dyn CatalogApi>) -> Self {
        Self { reorder, catalog }
    }

    /// Uses one backend for both services.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ReorderApi + CatalogApi + 'static,
    {
        Self {
            reorder: backend.clone(),
            catalog: backend,
        }
    }
}
