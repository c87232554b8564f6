//! Course tree node types.
//!
//! A [`BaseClass`] (course) owns an ordered list of [`Path`]s, a path owns
//! [`Lesson`]s and a lesson owns [`Section`]s. Nodes do not hold their
//! children directly; the tree keeps child lists separately so a reorder can
//! replace one list without touching any node outside it (see
//! [`crate::tree::CourseTree`]).
use super::ids::{ItemKind, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The course template at the root of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseClass {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl BaseClass {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }
}

/// A named sequence of lessons within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: u32,
}

impl Path {
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>, order_index: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            order_index,
        }
    }
}

/// A named sequence of sections within a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: u32,
}

impl Lesson {
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>, order_index: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            order_index,
        }
    }
}

/// Leaf content unit. `content` is the editor payload, kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub order_index: u32,
}

impl Section {
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>, order_index: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: Value::Null,
            order_index,
        }
    }
}

/// A course as returned by the catalog on page load: the base class with
/// its paths eagerly included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOutline {
    #[serde(flatten)]
    pub course: BaseClass,
    #[serde(default)]
    pub paths: Vec<Path>,
}

/// Any node below the course root.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Path(Path),
    Lesson(Lesson),
    Section(Section),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Path(p) => &p.id,
            Node::Lesson(l) => &l.id,
            Node::Section(s) => &s.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Node::Path(p) => &p.title,
            Node::Lesson(l) => &l.title,
            Node::Section(s) => &s.title,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Node::Path(_) => ItemKind::Path,
            Node::Lesson(_) => ItemKind::Lesson,
            Node::Section(_) => ItemKind::Section,
        }
    }

    pub fn order_index(&self) -> u32 {
        match self {
            Node::Path(p) => p.order_index,
            Node::Lesson(l) => l.order_index,
            Node::Section(s) => s.order_index,
        }
    }

    pub(crate) fn set_order_index(&mut self, index: u32) {
        match self {
            Node::Path(p) => p.order_index = index,
            Node::Lesson(l) => l.order_index = index,
            Node::Section(s) => s.order_index = index,
        }
    }

    /// Merges the present fields of `update` into this node.
    ///
    /// Returns the name of the first field that does not exist on this kind
    /// of node; nothing is modified in that case.
    pub(crate) fn apply(&mut self, update: NodeUpdate) -> Result<(), &'static str> {
        if update.content.is_some() && !matches!(self, Node::Section(_)) {
            return Err("content");
        }
        if update.description.is_some() && matches!(self, Node::Section(_)) {
            return Err("description");
        }

        match self {
            Node::Path(p) => {
                if let Some(title) = update.title {
                    p.title = title;
                }
                if let Some(description) = update.description {
                    p.description = Some(description);
                }
            }
            Node::Lesson(l) => {
                if let Some(title) = update.title {
                    l.title = title;
                }
                if let Some(description) = update.description {
                    l.description = Some(description);
                }
            }
            Node::Section(s) => {
                if let Some(title) = update.title {
                    s.title = title;
                }
                if let Some(content) = update.content {
                    s.content = content;
                }
            }
        }
        Ok(())
    }
}

// DTO for local field edits. `title` maps onto the course name when the
// base class is edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<Value>,
}

impl NodeUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn content(content: Value) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outline_deserializes_flattened_course() {
        let outline: CourseOutline = serde_json::from_value(json!({
            "id": "c1",
            "name": "Algebra",
            "paths": [
                { "id": "p1", "title": "Basics", "order_index": 0 },
                { "id": "p2", "title": "Equations", "order_index": 1 }
            ]
        }))
        .unwrap();

        assert_eq!(outline.course.id, NodeId::from("c1"));
        assert_eq!(outline.course.description, None);
        assert_eq!(outline.paths.len(), 2);
        assert_eq!(outline.paths[1].order_index, 1);
    }

    #[test]
    fn test_apply_rejects_content_on_lesson() {
        let mut node = Node::Lesson(Lesson::new("l1", "Intro", 0));
        let result = node.apply(NodeUpdate {
            title: Some("Renamed".into()),
            content: Some(json!({"blocks": []})),
            ..NodeUpdate::default()
        });

        assert_eq!(result, Err("content"));
        assert_eq!(node.title(), "Intro");
    }

    #[test]
    fn test_apply_merges_section_fields() {
        let mut node = Node::Section(Section::new("s1", "Warmup", 2));
        node.apply(NodeUpdate::content(json!({"text": "2 + 2"})))
            .unwrap();
        node.apply(NodeUpdate::title("Warm-up")).unwrap();

        match node {
            Node::Section(s) => {
                assert_eq!(s.title, "Warm-up");
                assert_eq!(s.content, json!({"text": "2 + 2"}));
                assert_eq!(s.order_index, 2);
            }
            other => panic!("Expected section, got {:?}", other),
        }
    }
}
