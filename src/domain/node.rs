//! Tree node entity

use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

/// Stable node identifier, used for equality and as the persistence key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Tree node in the arena-based hierarchy.
///
/// Structural fields (`parent`, `children`, `is_folded`) are only changed by
/// [`TreeModel`](crate::domain::TreeModel), which keeps them consistent with
/// the visible projection.
#[derive(Debug, Clone)]
pub struct Node<P> {
    pub(crate) id: NodeId,
    pub(crate) payload: P,
    /// Arena index of the parent, None for the root
    pub(crate) parent: Option<Index>,
    /// Arena indices of the children, in display order
    pub(crate) children: Vec<Index>,
    pub(crate) is_folded: bool,
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl<P> Node<P> {
    /// Create a detached, unfolded node at the origin.
    pub fn new(id: impl Into<NodeId>, payload: P) -> Self {
        Self {
            id: id.into(),
            payload,
            parent: None,
            children: Vec::new(),
            is_folded: false,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn is_folded(&self) -> bool {
        self.is_folded
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Layout position as `(x, y)`.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub(crate) fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

impl<P: fmt::Display> fmt::Display for Node<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_new_node_then_detached_unfolded_at_origin() {
        let node = Node::new(7, "root");
        assert_eq!(node.id(), NodeId(7));
        assert!(node.is_root());
        assert!(!node.is_folded());
        assert!(!node.has_children());
        assert_eq!(node.position(), (0.0, 0.0));
    }

    #[test]
    fn given_node_when_translated_then_offsets_accumulate() {
        let mut node = Node::new(1, ());
        node.translate(10.0, -5.0);
        node.translate(2.5, 1.0);
        assert_eq!(node.position(), (12.5, -4.0));
    }

    #[test]
    fn given_node_when_displayed_then_shows_id_and_payload() {
        let node = Node::new(3, "Sequence");
        assert_eq!(node.to_string(), "#3 Sequence");
    }
}
