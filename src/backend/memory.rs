//! In-process backend holding a whole course tree.
//!
//! Applies reorders for real and validates them the way the database-backed
//! route does: the ordered ids must be exactly the current children of the
//! parent. Used by the demo binary and by full-system tests, with
//! [`MemoryBackend::fail_next_reorders`] for fault injection.
use super::api::{ApiError, CatalogApi, ReorderApi, ReorderRequest};
use crate::model::{BaseClass, CourseOutline, ItemKind, Lesson, ListKey, NodeId, Path, Section};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Default)]
struct MemoryState {
    courses: HashMap<NodeId, BaseClass>,
    paths: HashMap<NodeId, Vec<Path>>,
    lessons: HashMap<NodeId, Vec<Lesson>>,
    sections: HashMap<NodeId, Vec<Section>>,
    fail_reorders: usize,
    fetches: usize,
    reorders: usize,
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

/// Rewrites `order_index` to match the vector position.
trait Ordered {
    fn id(&self) -> &NodeId;
    fn set_order_index(&mut self, index: u32);
}

macro_rules! impl_ordered {
    ($($t:ty),*) => {$(
        impl Ordered for $t {
            fn id(&self) -> &NodeId { &self.id }
            fn set_order_index(&mut self, index: u32) { self.order_index = index; }
        }
    )*};
}

impl_ordered!(Path, Lesson, Section);

/// Reorders `items` to follow `ordered_ids`, which must name exactly the
/// same set of ids.
fn apply_order<T: Ordered>(items: &mut Vec<T>, ordered_ids: &[NodeId]) -> Result<(), ApiError> {
    let current: HashSet<&NodeId> = items.iter().map(|i| i.id()).collect();
    let requested: HashSet<&NodeId> = ordered_ids.iter().collect();
    if current != requested || requested.len() != ordered_ids.len() {
        return Err(ApiError::Status {
            status: 400,
            message: "orderedIds must list every child exactly once".to_string(),
        });
    }

    let mut by_id: HashMap<NodeId, T> = items.drain(..).map(|i| (i.id().clone(), i)).collect();
    for (index, id) in ordered_ids.iter().enumerate() {
        if let Some(mut item) = by_id.remove(id) {
            item.set_order_index(index as u32);
            items.push(item);
        }
    }
    Ok(())
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_course(&self, outline: CourseOutline) {
        let mut state = self.state.lock().await;
        let mut paths = outline.paths;
        paths.sort_by_key(|p| p.order_index);
        state.paths.insert(outline.course.id.clone(), paths);
        state.courses.insert(outline.course.id.clone(), outline.course);
    }

    pub async fn insert_lessons(&self, path_id: impl Into<NodeId>, mut lessons: Vec<Lesson>) {
        lessons.sort_by_key(|l| l.order_index);
        self.state.lock().await.lessons.insert(path_id.into(), lessons);
    }

    pub async fn insert_sections(&self, lesson_id: impl Into<NodeId>, mut sections: Vec<Section>) {
        sections.sort_by_key(|s| s.order_index);
        self.state
            .lock()
            .await
            .sections
            .insert(lesson_id.into(), sections);
    }

    /// Makes the next `count` reorder calls fail with a 500.
    pub async fn fail_next_reorders(&self, count: usize) {
        self.state.lock().await.fail_reorders = count;
    }

    /// The persisted order of a sibling list.
    pub async fn stored_order(&self, key: &ListKey) -> Option<Vec<NodeId>> {
        let state = self.state.lock().await;
        match key.kind {
            ItemKind::Path => state
                .paths
                .get(&key.parent_id)
                .map(|v| v.iter().map(|p| p.id.clone()).collect()),
            ItemKind::Lesson => state
                .lessons
                .get(&key.parent_id)
                .map(|v| v.iter().map(|l| l.id.clone()).collect()),
            ItemKind::Section => state
                .sections
                .get(&key.parent_id)
                .map(|v| v.iter().map(|s| s.id.clone()).collect()),
        }
    }

    /// Number of lesson/section fetches served.
    pub async fn fetch_count(&self) -> usize {
        self.state.lock().await.fetches
    }

    /// Number of reorder calls received, failed ones included.
    pub async fn reorder_count(&self) -> usize {
        self.state.lock().await.reorders
    }

    /// A small two-path course for the demo binary.
    pub async fn demo(course_id: impl Into<NodeId>) -> Self {
        let course_id = course_id.into();
        let backend = Self::new();
        backend
            .insert_course(CourseOutline {
                course: BaseClass::new(course_id, "Introduction to Algebra"),
                paths: vec![
                    Path::new("path-foundations", "Foundations", 0),
                    Path::new("path-equations", "Linear Equations", 1),
                    Path::new("path-review", "Review", 2),
                ],
            })
            .await;
        backend
            .insert_lessons(
                "path-foundations",
                vec![
                    Lesson::new("lesson-numbers", "Number Sense", 0),
                    Lesson::new("lesson-variables", "Variables", 1),
                ],
            )
            .await;
        backend
            .insert_sections(
                "lesson-variables",
                vec![
                    Section::new("section-what", "What is a variable?", 0),
                    Section::new("section-practice", "Practice", 1),
                    Section::new("section-quiz", "Quick quiz", 2),
                ],
            )
            .await;
        backend
    }
}

#[async_trait]
impl ReorderApi for MemoryBackend {
    async fn reorder_items(&self, request: &ReorderRequest) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.reorders += 1;
        if state.fail_reorders > 0 {
            state.fail_reorders -= 1;
            warn!(parent_id = %request.parent_id, "Injected reorder failure");
            return Err(ApiError::Status {
                status: 500,
                message: "injected failure".to_string(),
            });
        }

        let parent = request.parent_id.clone();
        let result = match request.item_type {
            ItemKind::Path => state
                .paths
                .get_mut(&parent)
                .map(|items| apply_order(items, &request.ordered_ids)),
            ItemKind::Lesson => state
                .lessons
                .get_mut(&parent)
                .map(|items| apply_order(items, &request.ordered_ids)),
            ItemKind::Section => state
                .sections
                .get_mut(&parent)
                .map(|items| apply_order(items, &request.ordered_ids)),
        };

        match result {
            Some(Ok(())) => {
                info!(item_type = %request.item_type, %parent, "Order stored");
                Ok(())
            }
            Some(Err(e)) => Err(e),
            None => Err(ApiError::NotFound(parent.to_string())),
        }
    }
}

#[async_trait]
impl CatalogApi for MemoryBackend {
    async fn load_course(&self, course_id: &NodeId) -> Result<CourseOutline, ApiError> {
        let state = self.state.lock().await;
        let course = state
            .courses
            .get(course_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(course_id.to_string()))?;
        let paths = state.paths.get(course_id).cloned().unwrap_or_default();
        Ok(CourseOutline { course, paths })
    }

    async fn fetch_lessons(&self, path_id: &NodeId) -> Result<Vec<Lesson>, ApiError> {
        let mut state = self.state.lock().await;
        state.fetches += 1;
        debug!(%path_id, "Fetch lessons");
        Ok(state.lessons.get(path_id).cloned().unwrap_or_default())
    }

    async fn fetch_sections(&self, lesson_id: &NodeId) -> Result<Vec<Section>, ApiError> {
        let mut state = self.state.lock().await;
        state.fetches += 1;
        debug!(%lesson_id, "Fetch sections");
        Ok(state.sections.get(lesson_id).cloned().unwrap_or_default())
    }
}
