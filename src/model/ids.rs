use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for any node in the course tree.
///
/// Ids come from the database as opaque strings (usually UUIDs), so the
/// wrapper is transparent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of item held in a sibling list.
///
/// Serialized lowercase because it doubles as the `itemType` field of the
/// reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Path,
    Lesson,
    Section,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Path => "path",
            ItemKind::Lesson => "lesson",
            ItemKind::Section => "section",
        }
    }

    /// Label of the node that owns a list of this kind.
    pub fn parent_label(self) -> &'static str {
        match self {
            ItemKind::Path => "course",
            ItemKind::Lesson => "path",
            ItemKind::Section => "lesson",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Addresses one sibling list: all children of `kind` under `parent_id`.
///
/// The course id is the parent of the path list, a path id the parent of its
/// lessons, a lesson id the parent of its sections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub kind: ItemKind,
    pub parent_id: NodeId,
}

impl ListKey {
    pub fn new(kind: ItemKind, parent_id: impl Into<NodeId>) -> Self {
        Self {
            kind,
            parent_id: parent_id.into(),
        }
    }

    pub fn paths(course_id: impl Into<NodeId>) -> Self {
        Self::new(ItemKind::Path, course_id)
    }

    pub fn lessons(path_id: impl Into<NodeId>) -> Self {
        Self::new(ItemKind::Lesson, path_id)
    }

    pub fn sections(lesson_id: impl Into<NodeId>) -> Self {
        Self::new(ItemKind::Section, lesson_id)
    }
}

impl Display for ListKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            // A course has a single path list.
            ItemKind::Path => write!(f, "paths"),
            kind => write!(
                f,
                "{}s for {} {}",
                kind.label(),
                kind.parent_label(),
                self.parent_id
            ),
        }
    }
}

/// A child list loaded on first expansion: the lessons of a path or the
/// sections of a lesson. Paths arrive with the course and are never
/// fetched this way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LazyList {
    Lessons(NodeId),
    Sections(NodeId),
}

impl LazyList {
    pub fn key(&self) -> ListKey {
        match self {
            LazyList::Lessons(path_id) => ListKey::lessons(path_id.clone()),
            LazyList::Sections(lesson_id) => ListKey::sections(lesson_id.clone()),
        }
    }
}
