//! # Backend
//!
//! The persistence contract of the studio and its implementations:
//!
//! - [`HttpBackend`]: the REST API.
//! - [`MemoryBackend`]: an in-process store for demos and integration tests.
//! - [`MockBackend`]: an expectation queue for tests that need to control
//!   exactly when and how each call completes.

pub mod api;
pub mod http;
pub mod memory;
pub mod mock;

pub use api::{
    fetch_children, ApiError, CatalogApi, ErrorBody, ReorderApi, ReorderRequest, StudioContext,
};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use mock::MockBackend;
