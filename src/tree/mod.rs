//! The in-memory course tree and the list arithmetic used to reorder it.

pub mod course_tree;
pub mod ordering;

pub use course_tree::*;
pub use ordering::*;

use crate::model::{ItemKind, NodeId};

/// Errors raised when a caller addresses the tree incorrectly.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),
    #[error("A {kind} has no children to expand: {id}")]
    NotExpandable { kind: ItemKind, id: NodeId },
    #[error("Field '{field}' does not apply to {node} {id}")]
    FieldNotApplicable {
        field: &'static str,
        node: &'static str,
        id: NodeId,
    },
}
