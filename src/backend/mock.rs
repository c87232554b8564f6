//! # Mock Backend
//!
//! An expectation-queue backend for testing the studio without a server.
//!
//! Queue the calls you expect with `expect_*`, choose what each returns,
//! optionally [`hold`](ReorderExpectationBuilder::hold) the response until
//! the test releases it, then hand the mock to the studio. Every call is
//! recorded so tests can assert on request bodies, and [`MockBackend::verify`]
//! fails if an expectation was never consumed.
//!
//! ```ignore
//! let mock = Arc::new(MockBackend::new());
//! let mut expectation = mock.expect_reorder();
//! let release = expectation.hold();
//! expectation.return_err(ApiError::Status { status: 500, message: "boom".into() });
//!
//! // ... issue the reorder, inspect the optimistic state ...
//! release.release();
//! mock.verify();
//! ```
//!
//! Holding a response is what makes the optimistic window observable: the
//! studio has already committed the new order, but the persistence result
//! cannot arrive until the test says so.
use super::api::{ApiError, CatalogApi, ReorderApi, ReorderRequest};
use crate::model::{CourseOutline, Lesson, NodeId, Section};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Represents an expected call to the mock backend.
enum Expectation {
    Reorder {
        response: Result<(), ApiError>,
        gate: Option<oneshot::Receiver<()>>,
    },
    LoadCourse {
        course_id: NodeId,
        response: Result<CourseOutline, ApiError>,
    },
    FetchLessons {
        path_id: NodeId,
        response: Result<Vec<Lesson>, ApiError>,
        gate: Option<oneshot::Receiver<()>>,
    },
    FetchSections {
        lesson_id: NodeId,
        response: Result<Vec<Section>, ApiError>,
        gate: Option<oneshot::Receiver<()>>,
    },
}

impl Expectation {
    fn describe(&self) -> String {
        match self {
            Expectation::Reorder { .. } => "reorder_items".to_string(),
            Expectation::LoadCourse { course_id, .. } => format!("load_course({course_id})"),
            Expectation::FetchLessons { path_id, .. } => format!("fetch_lessons({path_id})"),
            Expectation::FetchSections { lesson_id, .. } => format!("fetch_sections({lesson_id})"),
        }
    }
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reorder(ReorderRequest),
    LoadCourse(NodeId),
    FetchLessons(NodeId),
    FetchSections(NodeId),
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

/// Releases a held response.
pub struct Release(oneshot::Sender<()>);

impl Release {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

fn gate() -> (Release, oneshot::Receiver<()>) {
    let (tx, rx) = oneshot::channel();
    (Release(tx), rx)
}

#[derive(Default)]
pub struct MockBackend {
    expectations: Queue,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `reorder_items` call.
    pub fn expect_reorder(&self) -> ReorderExpectationBuilder {
        ReorderExpectationBuilder {
            expectations: self.expectations.clone(),
            gate: None,
        }
    }

    /// Expects a `load_course` call.
    pub fn expect_load_course(&self, course_id: impl Into<NodeId>) -> LoadCourseExpectationBuilder {
        LoadCourseExpectationBuilder {
            course_id: course_id.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `fetch_lessons` call.
    pub fn expect_fetch_lessons(&self, path_id: impl Into<NodeId>) -> FetchExpectationBuilder<Lesson> {
        FetchExpectationBuilder {
            parent_id: path_id.into(),
            expectations: self.expectations.clone(),
            gate: None,
            wrap: |parent_id, response, gate| Expectation::FetchLessons {
                path_id: parent_id,
                response,
                gate,
            },
        }
    }

    /// Expects a `fetch_sections` call.
    pub fn expect_fetch_sections(
        &self,
        lesson_id: impl Into<NodeId>,
    ) -> FetchExpectationBuilder<Section> {
        FetchExpectationBuilder {
            parent_id: lesson_id.into(),
            expectations: self.expectations.clone(),
            gate: None,
            wrap: |parent_id, response, gate| Expectation::FetchSections {
                lesson_id: parent_id,
                response,
                gate,
            },
        }
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The bodies of every reorder call received so far.
    pub fn reorder_requests(&self) -> Vec<ReorderRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Reorder(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            let pending: Vec<String> = exps.iter().map(Expectation::describe).collect();
            panic!(
                "Not all expectations were met. {} remaining: {}",
                exps.len(),
                pending.join(", ")
            );
        }
    }

    fn next(&self, call: Call) -> Expectation {
        self.calls.lock().unwrap().push(call.clone());
        let mut exps = self.expectations.lock().unwrap();
        match exps.pop_front() {
            Some(expectation) => expectation,
            None => panic!("Unexpected call with no expectation queued: {:?}", call),
        }
    }
}

async fn wait_for(gate: Option<oneshot::Receiver<()>>) {
    if let Some(gate) = gate {
        // A dropped Release counts as released.
        let _ = gate.await;
    }
}

#[async_trait]
impl ReorderApi for MockBackend {
    async fn reorder_items(&self, request: &ReorderRequest) -> Result<(), ApiError> {
        match self.next(Call::Reorder(request.clone())) {
            Expectation::Reorder { response, gate } => {
                wait_for(gate).await;
                response
            }
            other => panic!("Expected {}, got reorder_items", other.describe()),
        }
    }
}

#[async_trait]
impl CatalogApi for MockBackend {
    async fn load_course(&self, course_id: &NodeId) -> Result<CourseOutline, ApiError> {
        match self.next(Call::LoadCourse(course_id.clone())) {
            Expectation::LoadCourse {
                course_id: expected,
                response,
            } => {
                assert_eq!(&expected, course_id, "load_course called for the wrong course");
                response
            }
            other => panic!("Expected {}, got load_course({course_id})", other.describe()),
        }
    }

    async fn fetch_lessons(&self, path_id: &NodeId) -> Result<Vec<Lesson>, ApiError> {
        match self.next(Call::FetchLessons(path_id.clone())) {
            Expectation::FetchLessons {
                path_id: expected,
                response,
                gate,
            } => {
                assert_eq!(&expected, path_id, "fetch_lessons called for the wrong path");
                wait_for(gate).await;
                response
            }
            other => panic!("Expected {}, got fetch_lessons({path_id})", other.describe()),
        }
    }

    async fn fetch_sections(&self, lesson_id: &NodeId) -> Result<Vec<Section>, ApiError> {
        match self.next(Call::FetchSections(lesson_id.clone())) {
            Expectation::FetchSections {
                lesson_id: expected,
                response,
                gate,
            } => {
                assert_eq!(&expected, lesson_id, "fetch_sections called for the wrong lesson");
                wait_for(gate).await;
                response
            }
            other => panic!("Expected {}, got fetch_sections({lesson_id})", other.describe()),
        }
    }
}

/// Builder for `reorder_items` expectations.
pub struct ReorderExpectationBuilder {
    expectations: Queue,
    gate: Option<oneshot::Receiver<()>>,
}

impl ReorderExpectationBuilder {
    /// Holds the response until the returned handle is released.
    pub fn hold(&mut self) -> Release {
        let (release, rx) = gate();
        self.gate = Some(rx);
        release
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self) {
        self.push(Ok(()));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ApiError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<(), ApiError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Reorder {
            response,
            gate: self.gate,
        });
    }
}

/// Builder for `load_course` expectations.
pub struct LoadCourseExpectationBuilder {
    course_id: NodeId,
    expectations: Queue,
}

impl LoadCourseExpectationBuilder {
    pub fn return_ok(self, outline: CourseOutline) {
        self.push(Ok(outline));
    }

    pub fn return_err(self, error: ApiError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<CourseOutline, ApiError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::LoadCourse {
            course_id: self.course_id,
            response,
        });
    }
}

type WrapFetch<T> = fn(NodeId, Result<Vec<T>, ApiError>, Option<oneshot::Receiver<()>>) -> Expectation;

/// Builder for `fetch_lessons` / `fetch_sections` expectations.
pub struct FetchExpectationBuilder<T> {
    parent_id: NodeId,
    expectations: Queue,
    gate: Option<oneshot::Receiver<()>>,
    wrap: WrapFetch<T>,
}

impl<T> FetchExpectationBuilder<T> {
    /// Holds the response until the returned handle is released.
    pub fn hold(&mut self) -> Release {
        let (release, rx) = gate();
        self.gate = Some(rx);
        release
    }

    pub fn return_ok(self, children: Vec<T>) {
        self.push(Ok(children));
    }

    pub fn return_err(self, error: ApiError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Vec<T>, ApiError>) {
        let expectation = (self.wrap)(self.parent_id, response, self.gate);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}
