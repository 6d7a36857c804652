/*
Rendering of assembled forests as text trees.
A forest has several heads, so each root becomes its own termtree.
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::UnitForest;

pub trait TreeNodeConvert {
    fn to_tree_strings(&self) -> Vec<Tree<String>>;
}

impl TreeNodeConvert for UnitForest {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_strings(&self) -> Vec<Tree<String>> {
        fn label(forest: &UnitForest, idx: Index) -> Option<String> {
            forest
                .get_node(idx)
                .map(|node| format!("{} [fte {}] ({})", node.unit.name, node.unit.fte, node.unit.id))
        }

        fn build_tree(forest: &UnitForest, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = forest.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(text) = label(forest, child_idx) {
                        let mut child_tree = Tree::new(text);
                        build_tree(forest, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        self.roots()
            .iter()
            .filter_map(|&root_idx| {
                let mut tree = Tree::new(label(self, root_idx)?);
                build_tree(self, root_idx, &mut tree);
                Some(tree)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::SiblingOrder;
    use crate::domain::testing::unit;

    #[test]
    fn given_forest_when_rendering_then_one_tree_per_root() {
        let hq = unit("HQ", 10, None);
        let sales = unit("Sales", 4, Some(hq.id));
        let branch = unit("Branch", 2, None);
        let forest = UnitForest::assemble(vec![hq, sales, branch], SiblingOrder::default());

        let trees = forest.to_tree_strings();
        assert_eq!(trees.len(), 2);

        let rendered = trees[1].to_string();
        assert!(rendered.starts_with("HQ [fte 10]"));
        assert!(rendered.contains("Sales [fte 4]"));
    }
}
