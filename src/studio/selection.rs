//! Which item the editor pane is showing.
//!
//! Starts on the base class and moves wherever the user clicks; there is no
//! terminal state.

use crate::model::{BaseClass, Lesson, Node, NodeId, Path, Section};
use crate::tree::{CourseTree, TreeError};

/// What to select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectTarget {
    BaseClass,
    Node(NodeId),
    KnowledgeBase,
    Assessments,
}

/// The selected item with a copy of its data at selection time (refreshed
/// whenever the item is edited or reordered).
#[derive(Debug, Clone, PartialEq)]
pub enum SelectedItem {
    BaseClass(BaseClass),
    Path(Path),
    Lesson(Lesson),
    Section(Section),
    KnowledgeBase,
    Assessments,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub id: NodeId,
    pub title: String,
    pub item: SelectedItem,
}

impl Selection {
    pub fn base_class(course: &BaseClass) -> Self {
        Self {
            id: course.id.clone(),
            title: course.name.clone(),
            item: SelectedItem::BaseClass(course.clone()),
        }
    }

    fn from_node(node: &Node) -> Self {
        let item = match node {
            Node::Path(p) => SelectedItem::Path(p.clone()),
            Node::Lesson(l) => SelectedItem::Lesson(l.clone()),
            Node::Section(s) => SelectedItem::Section(s.clone()),
        };
        Self {
            id: node.id().clone(),
            title: node.title().to_string(),
            item,
        }
    }

    /// Resolves `target` against the tree. Unknown ids are an error.
    pub fn resolve(tree: &CourseTree, target: &SelectTarget) -> Result<Self, TreeError> {
        let course = tree.course();
        match target {
            SelectTarget::BaseClass => Ok(Self::base_class(course)),
            SelectTarget::Node(id) if *id == course.id => Ok(Self::base_class(course)),
            SelectTarget::Node(id) => tree
                .node(id)
                .map(Self::from_node)
                .ok_or_else(|| TreeError::UnknownNode(id.clone())),
            SelectTarget::KnowledgeBase => Ok(Self {
                id: course.id.clone(),
                title: "Knowledge Base".to_string(),
                item: SelectedItem::KnowledgeBase,
            }),
            SelectTarget::Assessments => Ok(Self {
                id: course.id.clone(),
                title: "Assessments".to_string(),
                item: SelectedItem::Assessments,
            }),
        }
    }

    /// The target that would reselect this item.
    pub fn target(&self) -> SelectTarget {
        match self.item {
            SelectedItem::BaseClass(_) => SelectTarget::BaseClass,
            SelectedItem::Path(_) | SelectedItem::Lesson(_) | SelectedItem::Section(_) => {
                SelectTarget::Node(self.id.clone())
            }
            SelectedItem::KnowledgeBase => SelectTarget::KnowledgeBase,
            SelectedItem::Assessments => SelectTarget::Assessments,
        }
    }

    pub fn type_label(&self) -> &'static str {
        match self.item {
            SelectedItem::BaseClass(_) => "baseclass",
            SelectedItem::Path(_) => "path",
            SelectedItem::Lesson(_) => "lesson",
            SelectedItem::Section(_) => "section",
            SelectedItem::KnowledgeBase => "knowledgebase",
            SelectedItem::Assessments => "assessments",
        }
    }

    /// Re-reads the selected item's data from `tree`. Keeps the old data if
    /// the item is gone.
    pub fn refresh(&mut self, tree: &CourseTree) {
        if let Ok(fresh) = Self::resolve(tree, &self.target()) {
            *self = fresh;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CourseOutline;

    fn tree() -> CourseTree {
        CourseTree::from_outline(CourseOutline {
            course: BaseClass::new("c1", "Algebra"),
            paths: vec![Path::new("p1", "Basics", 0)],
        })
    }

    #[test]
    fn test_resolve_each_target() {
        let tree = tree();

        let path = Selection::resolve(&tree, &SelectTarget::Node("p1".into())).unwrap();
        assert_eq!(path.type_label(), "path");
        assert_eq!(path.title, "Basics");

        let kb = Selection::resolve(&tree, &SelectTarget::KnowledgeBase).unwrap();
        assert_eq!(kb.id, NodeId::from("c1"));
        assert_eq!(kb.item, SelectedItem::KnowledgeBase);

        let root = Selection::resolve(&tree, &SelectTarget::Node("c1".into())).unwrap();
        assert_eq!(root.type_label(), "baseclass");
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let err = Selection::resolve(&tree(), &SelectTarget::Node("zz".into())).unwrap_err();
        assert_eq!(err, TreeError::UnknownNode("zz".into()));
    }
}
