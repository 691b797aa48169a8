//! Layout collaborator
//!
//! A layout only sees the visible projection through [`LayoutTree`]: it can
//! read the structure and write coordinates, nothing else. The model copies
//! the coordinates back after [`Layout::recompute_layout`] returns.

use std::fmt;

use crate::domain::node::NodeId;

/// Assigns positions to the visible nodes of a tree.
pub trait Layout: fmt::Debug {
    fn recompute_layout(&self, tree: &mut LayoutTree);
}

#[derive(Debug, Clone)]
struct LayoutSlot {
    id: NodeId,
    children: Vec<usize>,
    x: f64,
    y: f64,
}

/// Structure-frozen snapshot of the visible projection.
///
/// Slots are numbered in pre-order, slot 0 is the root, so every parent has
/// a lower slot number than its children.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    slots: Vec<LayoutSlot>,
}

impl LayoutTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a slot; `parent` must be an already pushed slot.
    pub(crate) fn push(&mut self, id: NodeId, parent: Option<usize>, x: f64, y: f64) -> usize {
        let slot = self.slots.len();
        self.slots.push(LayoutSlot {
            id,
            children: Vec::new(),
            x,
            y,
        });
        if let Some(p) = parent {
            self.slots[p].children.push(slot);
        }
        slot
    }

    pub(crate) fn positions(&self) -> impl Iterator<Item = (NodeId, f64, f64)> + '_ {
        self.slots.iter().map(|s| (s.id, s.x, s.y))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn root(&self) -> Option<usize> {
        if self.slots.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    pub fn id(&self, slot: usize) -> NodeId {
        self.slots[slot].id
    }

    /// Visible children of `slot`, in display order.
    pub fn children(&self, slot: usize) -> &[usize] {
        &self.slots[slot].children
    }

    pub fn position(&self, slot: usize) -> (f64, f64) {
        let s = &self.slots[slot];
        (s.x, s.y)
    }

    pub fn set_position(&mut self, slot: usize, x: f64, y: f64) {
        let s = &mut self.slots[slot];
        s.x = x;
        s.y = y;
    }
}

/// Leaves the coordinates untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayout;

impl Layout for NoLayout {
    fn recompute_layout(&self, _tree: &mut LayoutTree) {}
}

/// Layered top-down layout.
///
/// Visible leaves take consecutive horizontal slots `sibling_spacing` apart,
/// each parent is centred over its first and last child, and every level sits
/// `level_spacing` below the previous one. The whole drawing is anchored so
/// the root keeps its current position, which keeps manual translations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TidyLayout {
    pub sibling_spacing: f64,
    pub level_spacing: f64,
}

impl Default for TidyLayout {
    fn default() -> Self {
        Self {
            sibling_spacing: 120.0,
            level_spacing: 80.0,
        }
    }
}

impl Layout for TidyLayout {
    fn recompute_layout(&self, tree: &mut LayoutTree) {
        let Some(root) = tree.root() else {
            return;
        };
        let anchor = tree.position(root);
        let n = tree.len();

        // Pre-order pass: depth and leaf slots, left to right.
        let mut depth = vec![0usize; n];
        let mut xs = vec![0.0f64; n];
        let mut next_leaf = 0.0;
        for slot in 0..n {
            let children = tree.children(slot);
            for &c in children {
                depth[c] = depth[slot] + 1;
            }
            if children.is_empty() {
                xs[slot] = next_leaf * self.sibling_spacing;
                next_leaf += 1.0;
            }
        }

        // Reverse pre-order visits children before their parent.
        for slot in (0..n).rev() {
            let children = tree.children(slot);
            if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
                xs[slot] = (xs[first] + xs[last]) / 2.0;
            }
        }

        let dx = anchor.0 - xs[root];
        let dy = anchor.1;
        for slot in 0..n {
            let y = depth[slot] as f64 * self.level_spacing;
            tree.set_position(slot, xs[slot] + dx, y + dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //      1
    //     / \
    //    2   3
    //   / \
    //  4   5
    fn sample(root_at: (f64, f64)) -> LayoutTree {
        let mut tree = LayoutTree::new();
        let r = tree.push(NodeId(1), None, root_at.0, root_at.1);
        let a = tree.push(NodeId(2), Some(r), 0.0, 0.0);
        tree.push(NodeId(4), Some(a), 0.0, 0.0);
        tree.push(NodeId(5), Some(a), 0.0, 0.0);
        tree.push(NodeId(3), Some(r), 0.0, 0.0);
        tree
    }

    #[test]
    fn given_tree_when_tidy_layout_then_parents_centred_over_children() {
        let mut tree = sample((0.0, 0.0));
        let layout = TidyLayout {
            sibling_spacing: 10.0,
            level_spacing: 100.0,
        };
        layout.recompute_layout(&mut tree);

        // leaves 4, 5, 3 at 0, 10, 20 before anchoring; 2 at 5; root at 12.5
        assert_eq!(tree.position(0), (0.0, 0.0));
        assert_eq!(tree.position(1), (-7.5, 100.0));
        assert_eq!(tree.position(2), (-12.5, 200.0));
        assert_eq!(tree.position(3), (-2.5, 200.0));
        assert_eq!(tree.position(4), (7.5, 100.0));
    }

    #[test]
    fn given_translated_root_when_tidy_layout_then_root_position_kept() {
        let mut tree = sample((300.0, 50.0));
        TidyLayout::default().recompute_layout(&mut tree);
        assert_eq!(tree.position(0), (300.0, 50.0));
        assert_eq!(tree.position(1).1, 130.0);
    }

    #[test]
    fn given_empty_tree_when_layout_then_nothing_happens() {
        let mut tree = LayoutTree::new();
        TidyLayout::default().recompute_layout(&mut tree);
        NoLayout.recompute_layout(&mut tree);
        assert!(tree.is_empty());
    }
}
