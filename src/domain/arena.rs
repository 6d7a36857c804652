use std::cmp::Ordering;
use std::collections::HashMap;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::entities::{BusinessUnit, UnitId};

/// How siblings are ordered by name when a forest is assembled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiblingOrder {
    /// Plain lexicographic comparison of names
    #[default]
    CaseSensitive,
    /// Names compared lowercased, ties broken case-sensitively
    CaseInsensitive,
}

impl SiblingOrder {
    /// Total order over siblings. Equal names fall back to the unit id.
    pub fn compare(self, a: &BusinessUnit, b: &BusinessUnit) -> Ordering {
        let by_name = match self {
            SiblingOrder::CaseSensitive => a.name.cmp(&b.name),
            SiblingOrder::CaseInsensitive => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
        };
        by_name.then_with(|| a.id.cmp(&b.id))
    }
}

/// Tree node in the arena-based forest.
#[derive(Debug)]
pub struct ForestNode {
    pub unit: BusinessUnit,
    /// Depth stamped at assembly time
    pub depth: usize,
    /// Indices of child nodes, in sibling order
    pub children: Vec<Index>,
}

/// Arena-based forest assembled from a flat scan of units.
///
/// Uses a generational arena, so parent/child links are indices rather than
/// shared pointers. Roots and children are kept in sibling order.
#[derive(Debug, Default)]
pub struct UnitForest {
    arena: Arena<ForestNode>,
    roots: Vec<Index>,
}

impl UnitForest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    /// Assemble the complete forest: every unit with no parent starts a tree at depth 1.
    pub fn assemble(units: impl IntoIterator<Item = BusinessUnit>, order: SiblingOrder) -> Self {
        Self::assemble_from(units, None, 1, order)
    }

    /// Assemble the trees hanging below `parent_id`, stamping their heads with `depth`.
    ///
    /// Units are grouped by parent and attached top-down. Units whose ancestry never
    /// reaches `parent_id` are left out.
    #[instrument(level = "debug", skip(units))]
    pub fn assemble_from(
        units: impl IntoIterator<Item = BusinessUnit>,
        parent_id: Option<UnitId>,
        depth: usize,
        order: SiblingOrder,
    ) -> Self {
        let mut groups: HashMap<Option<UnitId>, Vec<BusinessUnit>> =
            units.into_iter().into_group_map_by(|unit| unit.parent_id);
        for siblings in groups.values_mut() {
            siblings.sort_by(|a, b| order.compare(a, b));
        }

        let mut forest = Self::new();
        let mut pending = vec![(None, parent_id, depth)];

        while let Some((parent_idx, key, depth)) = pending.pop() {
            let Some(siblings) = groups.remove(&key) else {
                continue;
            };
            for unit in siblings {
                let id = unit.id;
                let idx = forest.insert_node(unit, depth, parent_idx);
                pending.push((Some(idx), Some(id), depth + 1));
            }
        }
        forest
    }

    #[instrument(level = "trace", skip(self, unit), fields(unit = %unit.id))]
    fn insert_node(&mut self, unit: BusinessUnit, depth: usize, parent: Option<Index>) -> Index {
        let node = ForestNode {
            unit,
            depth,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ForestNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal over all trees: parents before children, siblings in order.
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    /// Depth-ordered flat listing, as used for indented pickers.
    #[instrument(level = "debug", skip(self))]
    pub fn flatten(&self) -> Vec<FlatUnit> {
        self.iter()
            .map(|(_, node)| FlatUnit {
                unit: node.unit.clone(),
                depth: node.depth,
            })
            .collect()
    }

    /// Nested parent-to-children representation of the forest.
    #[instrument(level = "debug", skip(self))]
    pub fn to_nested(&self) -> Vec<UnitTreeNode> {
        fn build(forest: &UnitForest, idx: Index) -> Option<UnitTreeNode> {
            let node = forest.get_node(idx)?;
            Some(UnitTreeNode {
                unit: node.unit.clone(),
                depth: node.depth,
                children: node
                    .children
                    .iter()
                    .filter_map(|&child| build(forest, child))
                    .collect(),
            })
        }

        self.roots
            .iter()
            .filter_map(|&root| build(self, root))
            .collect()
    }
}

pub struct ForestIterator<'a> {
    forest: &'a UnitForest,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a UnitForest) -> Self {
        // Reverse so the first root is popped first
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a ForestNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
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

/// A unit with its nested children, as returned by the tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTreeNode {
    #[serde(flatten)]
    pub unit: BusinessUnit,
    pub depth: usize,
    pub children: Vec<UnitTreeNode>,
}

/// A unit with its depth, as returned by the flat listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatUnit {
    #[serde(flatten)]
    pub unit: BusinessUnit,
    pub depth: usize,
}

/// Pre-order flattening of an already nested tree, without going back to the store.
pub fn flatten(tree: &[UnitTreeNode]) -> Vec<FlatUnit> {
    fn walk(node: &UnitTreeNode, out: &mut Vec<FlatUnit>) {
        out.push(FlatUnit {
            unit: node.unit.clone(),
            depth: node.depth,
        });
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for node in tree {
        walk(node, &mut out);
    }
    out
}
