//! Accumulated, user-visible failures of background work.

use crate::backend::ApiError;
use crate::model::{ItemKind, ListKey};
use std::fmt::Display;

/// Which operation a logged error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorScope {
    /// Persisting the order of a sibling list failed and it was rolled back.
    Reorder(ListKey),
    /// Loading the children of a node failed.
    Expand(ListKey),
}

impl Display for ErrorScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorScope::Reorder(key) => match key.kind {
                ItemKind::Path => write!(f, "Failed to update path order"),
                kind => write!(
                    f,
                    "Failed to update {} order for {} {}",
                    kind.label(),
                    kind.parent_label(),
                    key.parent_id
                ),
            },
            ErrorScope::Expand(key) => write!(f, "Failed to load {key}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopedError {
    pub scope: ErrorScope,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: Vec<ScopedError>,
}

impl ErrorLog {
    pub fn record(&mut self, scope: ErrorScope, error: &ApiError) -> &ScopedError {
        let message = format!("{scope}: {error}");
        self.entries.push(ScopedError { scope, message });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ScopedError] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
