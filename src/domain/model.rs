//! Tree model: structural edits plus the visible-node projection
//!
//! The model owns the canonical tree (a [`TreeArena`]) and the ordered list of
//! visible nodes. Every successful mutation is followed by a layout pass over
//! the visible projection and a [`TreeEvent`] to subscribers.

use std::collections::HashSet;
use std::sync::mpsc::Receiver;

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::TreeArena;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::events::{EventBus, TreeEvent};
use crate::domain::layout::{Layout, LayoutTree, TidyLayout};
use crate::domain::node::{Node, NodeId};
use crate::domain::record::{index_records, NodeRecord};

#[derive(Debug)]
pub struct TreeModel<P> {
    arena: TreeArena<P>,
    /// Visible projection in insertion order, root first
    visible: Vec<NodeId>,
    visible_set: HashSet<NodeId>,
    layout: Box<dyn Layout>,
    events: EventBus,
    next_id: u32,
}

impl<P> Default for TreeModel<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> TreeModel<P> {
    /// Empty model using the default [`TidyLayout`].
    pub fn new() -> Self {
        Self::with_layout(TidyLayout::default())
    }

    pub fn with_layout(layout: impl Layout + 'static) -> Self {
        Self {
            arena: TreeArena::new(),
            visible: Vec::new(),
            visible_set: HashSet::new(),
            layout: Box::new(layout),
            events: EventBus::default(),
            next_id: 0,
        }
    }

    pub fn set_layout(&mut self, layout: impl Layout + 'static) {
        self.layout = Box::new(layout);
        self.relayout();
    }

    /// Receive a [`TreeEvent`] after every successful mutation.
    pub fn subscribe(&mut self) -> Receiver<TreeEvent> {
        self.events.subscribe()
    }

    /// Create a detached node carrying a fresh id.
    pub fn new_node(&mut self, payload: P) -> Node<P> {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        Node::new(id, payload)
    }

    // ------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------

    pub fn root(&self) -> Option<NodeId> {
        self.arena.root().and_then(|idx| self.arena.id_at(idx))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.index_of(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<P>> {
        self.arena.get_by_id(id)
    }

    /// Payloads are not structural, so they may be edited in place.
    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut P> {
        let idx = self.arena.index_of(id)?;
        self.arena.get_node_mut(idx).map(|n| &mut n.payload)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.arena.id_at(p))
    }

    /// Child ids in display order; empty for unknown ids.
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|&c| self.arena.id_at(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.visible_set.contains(&id)
    }

    /// Nodes currently taking part in layout and display, root first.
    pub fn visible_nodes(&self) -> &[NodeId] {
        &self.visible
    }

    pub fn depth(&self) -> usize {
        self.arena.depth()
    }

    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.arena.leaf_nodes()
    }

    /// All nodes in pre-order, folded subtrees included.
    pub fn iter(&self) -> impl Iterator<Item = &Node<P>> {
        self.arena.iter().map(|(_, n)| n)
    }

    /// All nodes in post-order, children before parents.
    pub fn iter_postorder(&self) -> impl Iterator<Item = &Node<P>> {
        self.arena.iter_postorder().map(|(_, n)| n)
    }

    // ------------------------------------------------------------
    // Structural operations
    // ------------------------------------------------------------

    /// Add `node` as the last child of `parent`, or as the root when `parent` is None.
    ///
    /// A folded parent is unfolded first so the new node shows up immediately.
    #[instrument(level = "trace", skip(self, node), fields(id = %node.id))]
    pub fn add(&mut self, node: Node<P>, parent: Option<NodeId>) -> DomainResult<NodeId> {
        if self.contains(node.id) {
            return Err(DomainError::DuplicateId(node.id));
        }
        let parent_idx = match parent {
            Some(pid) => Some(
                self.arena
                    .index_of(pid)
                    .ok_or(DomainError::InvalidParent(pid))?,
            ),
            None => match self.root() {
                Some(root) => return Err(DomainError::RootAlreadyExists(root)),
                None => None,
            },
        };

        let mut pending = Vec::new();
        if let (Some(pid), Some(pidx)) = (parent, parent_idx) {
            if self.is_folded_idx(pidx) {
                self.unfold_idx(pidx);
                pending.push(TreeEvent::Unfolded(pid));
            }
        }

        let id = node.id;
        self.insert(node, parent_idx);
        debug!(%id, parent = ?parent, "added node");
        self.relayout();
        pending.push(TreeEvent::NodeAdded { id, parent });
        self.emit_all(pending);
        Ok(id)
    }

    /// Remove `id` and its whole subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        let idx = self.index(id)?;
        if self.arena.root() == Some(idx) {
            return Err(DomainError::RootRemovalForbidden(id));
        }

        let removed = self.arena.remove_subtree(idx);
        self.hide_all(&removed);
        debug!(%id, count = removed.len(), "removed subtree");
        self.relayout();
        self.events.emit(TreeEvent::NodeRemoved {
            id,
            removed: removed.clone(),
        });
        Ok(removed)
    }

    /// Drop every node; the model becomes empty and rootless.
    #[instrument(level = "trace", skip(self))]
    pub fn clear(&mut self) {
        self.clear_silently();
        self.events.emit(TreeEvent::Cleared);
    }

    /// Translate the whole tree, folded subtrees included, by a relative offset.
    #[instrument(level = "trace", skip(self))]
    pub fn move_to_position(&mut self, dx: f64, dy: f64) {
        let order: Vec<Index> = self.arena.iter().map(|(idx, _)| idx).collect();
        if order.is_empty() {
            return;
        }
        for idx in order {
            if let Some(node) = self.arena.get_node_mut(idx) {
                node.translate(dx, dy);
            }
        }
        self.events.emit(TreeEvent::Translated { dx, dy });
    }

    /// Re-parent `from` under `to`.
    ///
    /// Returns `Ok(false)` without touching anything when `to` is `from` or one
    /// of its descendants, since the move would create a cycle.
    #[instrument(level = "trace", skip(self))]
    pub fn move_to_node(&mut self, from: NodeId, to: NodeId) -> DomainResult<bool> {
        let from_idx = self.index(from)?;
        let to_idx = self.index(to)?;
        if self.arena.is_ancestor_or_self(from_idx, to_idx) {
            debug!(%from, %to, "move ignored: target is inside the moved subtree");
            return Ok(false);
        }
        // not the root: the root is an ancestor of every node
        let old_parent = self.parent_of(from).ok_or_else(|| {
            DomainError::InvariantViolation(format!("non-root node {from} has no parent"))
        })?;

        let mut pending = Vec::new();
        if self.is_folded_idx(from_idx) {
            self.unfold_idx(from_idx);
            pending.push(TreeEvent::Unfolded(from));
        }
        if self.is_folded_idx(to_idx) {
            self.unfold_idx(to_idx);
            pending.push(TreeEvent::Unfolded(to));
        }

        self.arena.reparent(from_idx, to_idx);

        let should_show = self.is_visible(to);
        if self.is_visible(from) && !should_show {
            let subtree: Vec<NodeId> = self
                .arena
                .iter_from(from_idx)
                .map(|(_, n)| n.id)
                .collect();
            self.hide_all(&subtree);
        } else if !self.is_visible(from) && should_show {
            self.reveal_from(vec![from_idx]);
        }

        debug!(%from, %old_parent, %to, "moved node");
        self.relayout();
        pending.push(TreeEvent::NodeMoved {
            id: from,
            from: old_parent,
            to,
        });
        self.emit_all(pending);
        Ok(true)
    }

    /// Hide all descendants of `id`; the node itself stays visible.
    #[instrument(level = "trace", skip(self))]
    pub fn fold(&mut self, id: NodeId) -> DomainResult<()> {
        let idx = self.index(id)?;
        self.fold_idx(idx);
        self.relayout();
        self.events.emit(TreeEvent::Folded(id));
        Ok(())
    }

    /// Reveal the children of `id`, and below them every subtree that is not
    /// folded itself.
    #[instrument(level = "trace", skip(self))]
    pub fn unfold(&mut self, id: NodeId) -> DomainResult<()> {
        let idx = self.index(id)?;
        self.unfold_idx(idx);
        self.relayout();
        self.events.emit(TreeEvent::Unfolded(id));
        Ok(())
    }

    /// Fold an unfolded node, unfold a folded one. Returns the new fold state.
    pub fn toggle_fold(&mut self, id: NodeId) -> DomainResult<bool> {
        let idx = self.index(id)?;
        if self.is_folded_idx(idx) {
            self.unfold(id)?;
            Ok(false)
        } else {
            self.fold(id)?;
            Ok(true)
        }
    }

    // ------------------------------------------------------------
    // Flat record form
    // ------------------------------------------------------------

    /// Pre-order record sequence, record 0 is the root.
    #[instrument(level = "debug", skip(self))]
    pub fn flatten(&self) -> Vec<NodeRecord<P>>
    where
        P: Clone,
    {
        self.arena
            .iter()
            .map(|(_, node)| NodeRecord {
                id: node.id.0,
                payload: node.payload.clone(),
                children: node
                    .children
                    .iter()
                    .filter_map(|&c| self.arena.id_at(c))
                    .map(|c| c.0)
                    .collect(),
            })
            .collect()
    }

    /// Replace the tree with the one described by `records`.
    ///
    /// The records are validated before anything is touched; a malformed
    /// sequence leaves the current tree intact. Fold state is not part of the
    /// records, so every loaded node starts unfolded. Returns the number of
    /// nodes loaded.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn load_records(&mut self, records: Vec<NodeRecord<P>>) -> DomainResult<usize> {
        let by_id = index_records(&records)?;
        let total = records.len();
        self.clear_silently();

        let mut slots: Vec<Option<NodeRecord<P>>> = records.into_iter().map(Some).collect();
        let mut stack: Vec<(usize, Option<Index>)> = if total == 0 {
            Vec::new()
        } else {
            vec![(0, None)]
        };
        let mut loaded = 0;
        while let Some((pos, parent_idx)) = stack.pop() {
            let Some(record) = slots.get_mut(pos).and_then(Option::take) else {
                continue;
            };
            let idx = self.insert(Node::new(record.id, record.payload), parent_idx);
            loaded += 1;
            for child in record.children.iter().rev() {
                if let Some(&child_pos) = by_id.get(child) {
                    stack.push((child_pos, Some(idx)));
                }
            }
        }

        if loaded < total {
            warn!(
                skipped = total - loaded,
                "records unreachable from the root were skipped"
            );
        }
        self.relayout();
        self.events.emit(TreeEvent::Loaded { nodes: loaded });
        Ok(loaded)
    }

    // ------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------

    /// Verify the structural invariants, reporting the first violation.
    ///
    /// Checks: a single root listed first in the visible projection, no
    /// duplicate visible entries, acyclic parent/child links that agree in both
    /// directions, and a visible set equal to the nodes reachable through
    /// unfolded ancestors.
    pub fn check_invariants(&self) -> DomainResult<()> {
        let fail = |msg: String| Err(DomainError::InvariantViolation(msg));

        let Some(root_idx) = self.arena.root() else {
            if !self.arena.is_empty() || !self.visible.is_empty() {
                return fail("rootless tree has nodes or visible entries".into());
            }
            return Ok(());
        };
        let Some(root) = self.arena.get_node(root_idx) else {
            return fail("root index is stale".into());
        };
        if root.parent.is_some() {
            return fail(format!("root {} has a parent", root.id));
        }
        if self.visible.first() != Some(&root.id) {
            return fail(format!("root {} is not the first visible node", root.id));
        }

        let mut seen = HashSet::new();
        for id in &self.visible {
            if !seen.insert(*id) {
                return fail(format!("{id} is visible twice"));
            }
        }
        if seen != self.visible_set {
            return fail("visible list and visible set disagree".into());
        }

        for (idx, node) in self.arena.nodes() {
            if self.arena.index_of(node.id) != Some(idx) {
                return fail(format!("id lookup is stale for {}", node.id));
            }
            match node.parent {
                None if idx != root_idx => return fail(format!("{} is a second root", node.id)),
                Some(p) => match self.arena.get_node(p) {
                    Some(parent) if parent.children.iter().filter(|&&c| c == idx).count() == 1 => {}
                    _ => return fail(format!("{} is not listed once by its parent", node.id)),
                },
                None => {}
            }
            for &c in &node.children {
                if self.arena.get_node(c).and_then(|child| child.parent) != Some(idx) {
                    return fail(format!("child of {} points to another parent", node.id));
                }
            }
        }

        // A cycle or a detached node would make the reachable count differ.
        if self.arena.iter().take(self.arena.len() + 1).count() != self.arena.len() {
            return fail("not every node is reachable exactly once from the root".into());
        }

        let expected: HashSet<NodeId> = self.expected_visible(root_idx);
        if expected != self.visible_set {
            return fail("visible set does not match the fold state".into());
        }
        Ok(())
    }

    // ------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------

    fn index(&self, id: NodeId) -> DomainResult<Index> {
        self.arena
            .index_of(id)
            .ok_or(DomainError::NodeNotFound(id))
    }

    fn is_folded_idx(&self, idx: Index) -> bool {
        self.arena.get_node(idx).is_some_and(|n| n.is_folded)
    }

    /// Shared insertion path of interactive adds and loads.
    fn insert(&mut self, node: Node<P>, parent: Option<Index>) -> Index {
        let id = node.id;
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        let show = match parent {
            None => true,
            Some(pidx) => {
                !self.is_folded_idx(pidx)
                    && self
                        .arena
                        .id_at(pidx)
                        .is_some_and(|pid| self.visible_set.contains(&pid))
            }
        };
        let idx = self.arena.insert_node(node, parent);
        if show {
            self.show(id);
        }
        idx
    }

    fn show(&mut self, id: NodeId) {
        if self.visible_set.insert(id) {
            self.visible.push(id);
        }
    }

    fn hide_all(&mut self, ids: &[NodeId]) {
        let mut changed = false;
        for id in ids {
            changed |= self.visible_set.remove(id);
        }
        if changed {
            self.visible.retain(|v| self.visible_set.contains(v));
        }
    }

    fn clear_silently(&mut self) {
        self.arena.clear();
        self.visible.clear();
        self.visible_set.clear();
    }

    fn fold_idx(&mut self, idx: Index) {
        let mut hidden = Vec::new();
        let mut stack: Vec<Index> = self
            .arena
            .get_node(idx)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        while let Some(c) = stack.pop() {
            if let Some(node) = self.arena.get_node(c) {
                hidden.push(node.id);
                // an already folded node has no visible descendants
                if !node.is_folded {
                    stack.extend(node.children.iter().copied());
                }
            }
        }
        self.hide_all(&hidden);
        if let Some(node) = self.arena.get_node_mut(idx) {
            node.is_folded = true;
        }
    }

    fn unfold_idx(&mut self, idx: Index) {
        let Some(node) = self.arena.get_node_mut(idx) else {
            return;
        };
        node.is_folded = false;
        let id = node.id;
        let children = node.children.clone();
        if self.visible_set.contains(&id) {
            self.reveal_from(children.into_iter().rev().collect());
        }
    }

    /// Show every node on the stack and, below unfolded ones, their children,
    /// in pre-order. Nodes already visible are not duplicated.
    fn reveal_from(&mut self, mut stack: Vec<Index>) {
        while let Some(idx) = stack.pop() {
            let Some(node) = self.arena.get_node(idx) else {
                continue;
            };
            let id = node.id;
            let next: Vec<Index> = if node.is_folded {
                Vec::new()
            } else {
                node.children.iter().rev().copied().collect()
            };
            self.show(id);
            stack.extend(next);
        }
    }

    fn expected_visible(&self, root_idx: Index) -> HashSet<NodeId> {
        let mut expected = HashSet::new();
        let mut stack = vec![root_idx];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.arena.get_node(idx) {
                expected.insert(node.id);
                if !node.is_folded {
                    stack.extend(node.children.iter().copied());
                }
            }
        }
        expected
    }

    /// Run the layout over the visible projection and copy the coordinates back.
    fn relayout(&mut self) {
        let Some(root_idx) = self.arena.root() else {
            return;
        };
        let mut tree = LayoutTree::new();
        let mut stack = vec![(root_idx, None)];
        while let Some((idx, parent_slot)) = stack.pop() {
            let Some(node) = self.arena.get_node(idx) else {
                continue;
            };
            let slot = tree.push(node.id, parent_slot, node.x, node.y);
            if !node.is_folded {
                for &c in node.children.iter().rev() {
                    stack.push((c, Some(slot)));
                }
            }
        }

        self.layout.recompute_layout(&mut tree);

        for (id, x, y) in tree.positions() {
            if let Some(idx) = self.arena.index_of(id) {
                if let Some(node) = self.arena.get_node_mut(idx) {
                    node.x = x;
                    node.y = y;
                }
            }
        }
    }

    fn emit_all(&mut self, events: Vec<TreeEvent>) {
        for event in events {
            self.events.emit(event);
        }
    }
}
