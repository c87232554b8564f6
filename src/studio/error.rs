//! # Studio Errors
//!
//! Errors a caller of [`StudioClient`](super::StudioClient) can receive.
//! Persistence and fetch failures are not returned here: they become
//! entries in the studio's error log (see [`ErrorLog`](super::ErrorLog))
//! and never fail the call that triggered them.

use crate::backend::ApiError;
use crate::tree::TreeError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StudioError {
    #[error("Studio closed")]
    ActorClosed,
    #[error("Studio dropped response channel")]
    ActorDropped,
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("Failed to load course: {0}")]
    Load(#[from] ApiError),
    #[error("Backend unavailable: {0}")]
    Backend(ApiError),
}
