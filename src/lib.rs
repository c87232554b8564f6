//! # Course Studio
//!
//! > **The editing core of a course authoring tool.**
//!
//! A course (the *base class*) holds ordered paths, a path holds ordered
//! lessons, and a lesson holds ordered sections. This crate keeps that tree
//! in memory, lets the user reorder siblings by drag-and-drop, loads lessons
//! and sections lazily when a node is expanded, and tracks which item the
//! editor is showing.
//!
//! ## 🏗️ Design
//!
//! ### Optimistic reorders
//! A reorder is visible in the tree as soon as the call returns. Persisting
//! it happens in the background; if the backend refuses, exactly that
//! sibling list is put back the way it was and a scoped error is logged.
//! Responses that arrive after a newer reorder of the same list are
//! discarded.
//!
//! ### One actor per course
//! The tree is owned by a single [`StudioActor`](studio::StudioActor) running
//! in its own Tokio task. All mutation goes through its message loop, so no
//! locks guard the tree. Callers hold a cheap, cloneable
//! [`StudioClient`](studio::StudioClient).
//!
//! ### Snapshots with structural sharing
//! Every node and sibling list sits behind an `Arc`. A snapshot is an
//! `Arc<CourseTree>`; a mutation copies only the list it touches and the
//! nodes whose index changed. Snapshots taken earlier never change.
//!
//! ### Backends are injected
//! The actor receives its [`StudioContext`](backend::StudioContext) in
//! `run()`. Use [`HttpBackend`](backend::HttpBackend) for the real API,
//! [`MemoryBackend`](backend::MemoryBackend) for demos and
//! [`MockBackend`](backend::MockBackend) in tests.
//!
//! ## 🗺️ Module Tour
//!
//! - [`model`]: ids, item kinds and the course data types.
//! - [`tree`]: the arena tree and the pure move computation.
//! - [`studio`]: the actor, its client, outcomes, selection and error log.
//! - [`backend`]: the persistence contract and its implementations.
//! - [`lifecycle`]: starting and stopping a studio, tracing setup.
//! - [`config`]: TOML and environment configuration.
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod backend;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod studio;
pub mod tree;
