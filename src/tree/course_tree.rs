//! # Course Tree Arena
//!
//! The in-memory mirror of one course. Nodes live in a map keyed by id, and
//! every parent's children are held as a separate [`ChildState`] keyed by
//! [`ListKey`]. Loaded lists are `Arc<[NodeId]>`: replacing one list leaves
//! every other list pointer-identical, so observers comparing snapshots can
//! tell exactly which list changed.
//!
//! The tree is owned by the studio actor behind an `Arc`. Mutation goes
//! through `Arc::make_mut`, so a snapshot handed out earlier keeps seeing
//! the tree as it was.

use super::TreeError;
use crate::model::{BaseClass, CourseOutline, ItemKind, LazyList, ListKey, Node, NodeId, NodeUpdate};
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered ids of one parent's children.
pub type SiblingList = Arc<[NodeId]>;

/// Load state of a parent's child list.
///
/// `Loaded` with an empty list means the children were fetched and there are
/// none; it is never confused with `Unloaded`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildState {
    Unloaded,
    Loading,
    Loaded(SiblingList),
}

static UNLOADED: ChildState = ChildState::Unloaded;

#[derive(Debug, Clone)]
pub struct CourseTree {
    course: Arc<BaseClass>,
    nodes: HashMap<NodeId, Arc<Node>>,
    lists: HashMap<ListKey, ChildState>,
}

impl CourseTree {
    /// Builds the tree from a freshly loaded course. Paths are loaded
    /// eagerly; lessons and sections start out unloaded.
    pub fn from_outline(outline: CourseOutline) -> Self {
        let CourseOutline { course, paths } = outline;
        let mut tree = Self {
            course: Arc::new(course),
            nodes: HashMap::new(),
            lists: HashMap::new(),
        };
        let key = tree.paths_key();
        tree.splice_children(&key, paths.into_iter().map(Node::Path).collect());
        tree
    }

    pub fn course(&self) -> &BaseClass {
        &self.course
    }

    pub fn paths_key(&self) -> ListKey {
        ListKey::paths(self.course.id.clone())
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id).map(|node| node.as_ref())
    }

    /// Shared handle to a node, for identity comparisons between snapshots.
    pub fn node_arc(&self, id: &NodeId) -> Option<&Arc<Node>> {
        self.nodes.get(id)
    }

    pub fn child_state(&self, key: &ListKey) -> &ChildState {
        self.lists.get(key).unwrap_or(&UNLOADED)
    }

    /// The sibling list under `key`, if it has been loaded.
    pub fn siblings(&self, key: &ListKey) -> Option<&SiblingList> {
        match self.lists.get(key) {
            Some(ChildState::Loaded(list)) => Some(list),
            _ => None,
        }
    }

    /// Convenience for tests and logging: the loaded ids under `key`.
    pub fn ordered_ids(&self, key: &ListKey) -> Option<Vec<NodeId>> {
        self.siblings(key).map(|list| list.to_vec())
    }

    /// Every loaded list with its key.
    pub fn loaded_lists(&self) -> impl Iterator<Item = (&ListKey, &SiblingList)> {
        self.lists.iter().filter_map(|(key, state)| match state {
            ChildState::Loaded(list) => Some((key, list)),
            _ => None,
        })
    }

    pub fn children(&self, key: &ListKey) -> Option<Vec<&Node>> {
        self.siblings(key)
            .map(|list| list.iter().filter_map(|id| self.node(id)).collect())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Installs `list` as the loaded children under `key` and rewrites the
    /// order index of every node whose position changed.
    ///
    /// Nodes whose index is already correct keep their identity.
    pub(crate) fn replace_list(&mut self, key: &ListKey, list: SiblingList) {
        for (index, id) in list.iter().enumerate() {
            let index = index as u32;
            if let Some(node) = self.nodes.get_mut(id) {
                if node.order_index() != index {
                    Arc::make_mut(node).set_order_index(index);
                }
            }
        }
        self.lists.insert(key.clone(), ChildState::Loaded(list));
    }

    pub(crate) fn mark_loading(&mut self, key: &ListKey) {
        self.lists.insert(key.clone(), ChildState::Loading);
    }

    pub(crate) fn mark_unloaded(&mut self, key: &ListKey) {
        self.lists.remove(key);
    }

    /// Splices fetched children in under `key`, ordered by their persisted
    /// order index. The children's own lists are left as they were, which
    /// for a first load means unloaded.
    pub(crate) fn splice_children(&mut self, key: &ListKey, mut children: Vec<Node>) {
        children.sort_by_key(|node| node.order_index());
        let ids: SiblingList = children.iter().map(|node| node.id().clone()).collect();
        for node in children {
            self.nodes.insert(node.id().clone(), Arc::new(node));
        }
        self.replace_list(key, ids);
    }

    /// Merges a field edit into the node or, for the course id, into the
    /// base class.
    pub(crate) fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> Result<(), TreeError> {
        if *id == self.course.id {
            if update.content.is_some() {
                return Err(TreeError::FieldNotApplicable {
                    field: "content",
                    node: "course",
                    id: id.clone(),
                });
            }
            let course = Arc::make_mut(&mut self.course);
            if let Some(name) = update.title {
                course.name = name;
            }
            if let Some(description) = update.description {
                course.description = Some(description);
            }
            return Ok(());
        }

        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))?;
        let kind = node.kind();

        // Validate on a copy so a rejected edit never clones the shared node.
        let mut edited = Node::clone(&**node);
        edited
            .apply(update)
            .map_err(|field| TreeError::FieldNotApplicable {
                field,
                node: kind.label(),
                id: id.clone(),
            })?;
        *node = Arc::new(edited);
        Ok(())
    }

    /// The child list `id` expands into.
    pub fn lazy_list(&self, id: &NodeId) -> Result<LazyList, TreeError> {
        match self.node(id) {
            Some(Node::Path(_)) => Ok(LazyList::Lessons(id.clone())),
            Some(Node::Lesson(_)) => Ok(LazyList::Sections(id.clone())),
            Some(Node::Section(_)) => Err(TreeError::NotExpandable {
                kind: ItemKind::Section,
                id: id.clone(),
            }),
            None => Err(TreeError::UnknownNode(id.clone())),
        }
    }
}
