/*
termtree conversion for the arena forest.
Labels are supplied by the caller (the CLI colours node states).
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{Node, NodeForest};

pub trait ForestRender {
    /// One `termtree` per root, labels produced by `label`.
    fn to_trees<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&Node) -> String;
}

impl ForestRender for NodeForest {
    #[instrument(level = "debug", skip_all)]
    fn to_trees<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&Node) -> String,
    {
        fn build_tree<F>(forest: &NodeForest, node_idx: Index, label: &F) -> Tree<String>
        where
            F: Fn(&Node) -> String,
        {
            let Some(node) = forest.get_node(node_idx) else {
                return Tree::new(String::new());
            };
            let leaves: Vec<_> = node
                .children
                .iter()
                .map(|&child| build_tree(forest, child, label))
                .collect();
            Tree::new(label(&node.data)).with_leaves(leaves)
        }

        self.root_indices()
            .iter()
            .map(|&root| build_tree(self, root, &label))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_two_trees_when_rendering_then_returns_one_tree_per_root() {
        let forest = NodeForest::from_nodes(vec![
            Node::new("main"),
            Node::new("kitchen").with_parent("main"),
            Node::new("garage"),
        ]);

        let trees = forest.to_trees(|n| n.id.to_string());

        assert_eq!(trees.len(), 2);
        let rendered = trees[0].to_string();
        assert!(rendered.starts_with("main"));
        assert!(rendered.contains("kitchen"));
        assert_eq!(trees[1].to_string().trim(), "garage");
    }
}
