//! # Studio
//!
//! The actor that owns a course tree, plus its client, messages and the
//! values it returns. Start it with [`StudioActor::new`] and
//! [`StudioActor::run`], or let [`StudioSystem`](crate::lifecycle::StudioSystem)
//! do the wiring.

pub mod actor;
pub mod client;
pub mod error;
pub mod error_log;
pub mod message;
pub mod outcome;
pub mod selection;

pub use actor::StudioActor;
pub use client::StudioClient;
pub use error::StudioError;
pub use error_log::{ErrorLog, ErrorScope, ScopedError};
pub use message::{Response, StudioRequest};
pub use outcome::{
    ExpandOutcome, FetchStatus, PendingFetch, PendingReorder, ReorderOutcome, SyncStatus,
};
pub use selection::{SelectTarget, SelectedItem, Selection};
