use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::node::{Node, NodeId};

/// Arena-based storage for one tree.
///
/// Uses a generational arena so parent and child links are plain indices:
/// ownership flows downward through `children`, the `parent` index is only
/// used for upward walks. A stale index never aliases a reused slot.
#[derive(Debug)]
pub struct TreeArena<P> {
    /// Arena storage for all tree nodes
    arena: Arena<Node<P>>,
    /// Stable id to arena index
    ids: HashMap<NodeId, Index>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl<P> Default for TreeArena<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> TreeArena<P> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            ids: HashMap::new(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn index_of(&self, id: NodeId) -> Option<Index> {
        self.ids.get(&id).copied()
    }

    pub fn get_node(&self, idx: Index) -> Option<&Node<P>> {
        self.arena.get(idx)
    }

    pub(crate) fn get_node_mut(&mut self, idx: Index) -> Option<&mut Node<P>> {
        self.arena.get_mut(idx)
    }

    pub fn get_by_id(&self, id: NodeId) -> Option<&Node<P>> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    /// Id of the node stored at `idx`.
    pub fn id_at(&self, idx: Index) -> Option<NodeId> {
        self.arena.get(idx).map(|n| n.id)
    }

    /// Store `node` and link it as the last child of `parent`, or as the root.
    ///
    /// Callers check that the id is unused, that `parent` is live and that
    /// a parentless insert only happens on an empty arena.
    #[instrument(level = "trace", skip(self, node))]
    pub(crate) fn insert_node(&mut self, mut node: Node<P>, parent: Option<Index>) -> Index {
        let id = node.id;
        node.parent = parent;
        node.children.clear();
        let node_idx = self.arena.insert(node);
        self.ids.insert(id, node_idx);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    /// Unlink `idx` from its parent's children and make it the last child of `new_parent`.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn reparent(&mut self, idx: Index, new_parent: Index) {
        self.detach(idx);
        if let Some(parent) = self.arena.get_mut(new_parent) {
            parent.children.push(idx);
        }
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = Some(new_parent);
        }
    }

    fn detach(&mut self, idx: Index) {
        let parent = self.arena.get(idx).and_then(|n| n.parent);
        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.retain(|&c| c != idx);
            }
        }
    }

    /// Unlink `idx` from its parent and free it together with its subtree.
    ///
    /// Returns the removed ids in post-order (children before parents).
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn remove_subtree(&mut self, idx: Index) -> Vec<NodeId> {
        self.detach(idx);
        let order: Vec<Index> = self.iter_postorder_from(idx).map(|(i, _)| i).collect();
        let mut removed = Vec::with_capacity(order.len());
        for i in order {
            if let Some(node) = self.arena.remove(i) {
                self.ids.remove(&node.id);
                removed.push(node.id);
            }
        }
        if self.root == Some(idx) {
            self.root = None;
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.ids.clear();
        self.root = None;
    }

    /// True if `ancestor` is `idx` itself or lies on the path from `idx` to the root.
    #[instrument(level = "trace", skip(self))]
    pub fn is_ancestor_or_self(&self, ancestor: Index, idx: Index) -> bool {
        let mut current = Some(idx);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.arena.get(c).and_then(|n| n.parent);
        }
        false
    }

    /// Iterate over all live nodes in arena order (no tree order).
    pub(crate) fn nodes(&self) -> impl Iterator<Item = (Index, &Node<P>)> {
        self.arena.iter()
    }

    pub fn iter(&self) -> TreeIterator<'_, P> {
        TreeIterator::new(self, self.root)
    }

    pub fn iter_from(&self, idx: Index) -> TreeIterator<'_, P> {
        TreeIterator::new(self, Some(idx))
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_, P> {
        PostOrderIterator::new(self, self.root)
    }

    pub fn iter_postorder_from(&self, idx: Index) -> PostOrderIterator<'_, P> {
        PostOrderIterator::new(self, Some(idx))
    }

    /// Number of levels in the tree, 0 for an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut max_depth = 0;
        let mut stack = vec![(root, 1)];
        while let Some((idx, level)) = stack.pop() {
            max_depth = max_depth.max(level);
            if let Some(node) = self.arena.get(idx) {
                stack.extend(node.children.iter().map(|&c| (c, level + 1)));
            }
        }
        max_depth
    }

    /// Collects the ids of all nodes without children, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id)
            .collect()
    }
}

/// Pre-order iterator with an explicit stack.
pub struct TreeIterator<'a, P> {
    arena: &'a TreeArena<P>,
    stack: Vec<Index>,
}

impl<'a, P> TreeIterator<'a, P> {
    fn new(arena: &'a TreeArena<P>, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a, P> Iterator for TreeIterator<'a, P> {
    type Item = (Index, &'a Node<P>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Post-order iterator with an explicit stack.
pub struct PostOrderIterator<'a, P> {
    arena: &'a TreeArena<P>,
    stack: Vec<(Index, bool)>,
}

impl<'a, P> PostOrderIterator<'a, P> {
    fn new(arena: &'a TreeArena<P>, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.map(|idx| (idx, false)).into_iter().collect(),
        }
    }
}

impl<'a, P> Iterator for PostOrderIterator<'a, P> {
    type Item = (Index, &'a Node<P>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
