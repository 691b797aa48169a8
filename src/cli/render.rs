//! Text rendering of the visible projection

use std::fmt;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeId, TreeModel};

pub trait ToTermTree {
    /// Build a printable tree of the visible nodes; `positions` appends layout coordinates.
    fn to_term_tree(&self, positions: bool) -> Tree<String>;
}

impl<P: fmt::Display> ToTermTree for TreeModel<P> {
    #[instrument(level = "debug", skip(self))]
    fn to_term_tree(&self, positions: bool) -> Tree<String> {
        let Some(root) = self.root() else {
            return Tree::new("(empty tree)".to_string());
        };

        fn label<P: fmt::Display>(model: &TreeModel<P>, id: NodeId, positions: bool) -> String {
            let Some(node) = model.node(id) else {
                return id.to_string();
            };
            let mut text = node.to_string();
            if node.is_folded() && node.has_children() {
                text.push_str(&format!(" [+{}]", node.child_count()));
            }
            if positions {
                let (x, y) = node.position();
                text.push_str(&format!(" @ ({x:.1}, {y:.1})"));
            }
            text
        }

        fn build<P: fmt::Display>(
            model: &TreeModel<P>,
            id: NodeId,
            positions: bool,
            parent_tree: &mut Tree<String>,
        ) {
            for child in model.children_of(id) {
                if model.is_visible(child) {
                    let mut child_tree = Tree::new(label(model, child, positions));
                    build(model, child, positions, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let mut tree = Tree::new(label(self, root, positions));
        build(self, root, positions, &mut tree);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Node, NoLayout};

    fn model() -> TreeModel<&'static str> {
        let mut m = TreeModel::with_layout(NoLayout);
        m.add(Node::new(0, "Selector"), None).unwrap();
        m.add(Node::new(1, "Sequence"), Some(NodeId(0))).unwrap();
        m.add(Node::new(2, "Wait"), Some(NodeId(1))).unwrap();
        m.add(Node::new(3, "Attack"), Some(NodeId(0))).unwrap();
        m
    }

    #[test]
    fn given_tree_when_rendered_then_lists_nodes_in_order() {
        let text = model().to_term_tree(false).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#0 Selector");
        assert!(lines[1].ends_with("#1 Sequence"));
        assert!(lines[2].ends_with("#2 Wait"));
        assert!(lines[3].ends_with("#3 Attack"));
    }

    #[test]
    fn given_folded_node_when_rendered_then_children_hidden_and_marked() {
        let mut m = model();
        m.fold(NodeId(1)).unwrap();
        let text = m.to_term_tree(false).to_string();
        assert!(text.contains("#1 Sequence [+1]"), "{text}");
        assert!(!text.contains("Wait"), "{text}");
    }

    #[test]
    fn given_positions_flag_then_coordinates_appended() {
        let mut m = model();
        m.move_to_position(10.0, 5.0);
        let text = m.to_term_tree(true).to_string();
        assert!(text.starts_with("#0 Selector @ (10.0, 5.0)"), "{text}");
    }

    #[test]
    fn given_empty_model_then_placeholder() {
        let m = TreeModel::<String>::with_layout(NoLayout);
        assert_eq!(m.to_term_tree(false).to_string().trim(), "(empty tree)");
    }
}
